//! mbay-config
//!
//! Persisted user preferences for the Muscat Bay toolkit.
//! Owns the Config data structure plus disk persistence and backup helpers.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::{ConfigBackup, ConfigManager};
pub use model::{Config, Theme};
