//! mbay-domain
//!
//! Pure domain models (Zone, PropertyUnit, OperatingExpense, ServiceChargeCalculation).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod calculation;
pub mod common;
pub mod expense;
pub mod property;
pub mod zone;

pub use calculation::*;
pub use common::*;
pub use expense::*;
pub use property::*;
pub use zone::*;
