#![doc(test(attr(deny(warnings))))]

//! Muscat Bay service-charge and reserve-fund toolkit.
//!
//! The calculators live in `mbay-core`; this crate adds OMR formatting, CSV
//! import and export, tracing setup and the `muscat_bay_cli` shell.

pub mod cli;
pub mod currency;
pub mod errors;
pub mod import;
pub mod utils;

pub use errors::{CliError, FacilityError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Muscat Bay tracing initialized.");
    });
}
