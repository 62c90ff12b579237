//! mbay-core
//!
//! Rate tables, calculators, and services for Muscat Bay service charges.
//! Depends on mbay-domain. No CLI, no terminal I/O, no direct storage interactions.

pub mod error;
pub mod expense_service;
pub mod rates;
pub mod reference;
pub mod registry;
pub mod reserve_fund_service;
pub mod selection;
pub mod service_charge_service;
pub mod storage;

pub use error::CoreError;
pub use expense_service::*;
pub use rates::*;
pub use registry::*;
pub use reserve_fund_service::*;
pub use selection::*;
pub use service_charge_service::*;
pub use storage::{CalculationStore, HistoryBackupInfo};

#[cfg(test)]
mod tests;
