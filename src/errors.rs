use std::result::Result as StdResult;

use mbay_config::ConfigError;
use mbay_core::CoreError;
use thiserror::Error;

/// Unified error type for calculation, configuration, import and storage failures.
#[derive(Error, Debug)]
pub enum FacilityError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    Csv(String),
    #[error("Persistence error: {0}")]
    Storage(String),
}

pub type Result<T> = StdResult<T, FacilityError>;

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] FacilityError),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for FacilityError {
    fn from(err: std::io::Error) -> Self {
        FacilityError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for FacilityError {
    fn from(err: serde_json::Error) -> Self {
        FacilityError::Storage(err.to_string())
    }
}

impl From<csv::Error> for FacilityError {
    fn from(err: csv::Error) -> Self {
        FacilityError::Csv(err.to_string())
    }
}

impl From<ConfigError> for FacilityError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => FacilityError::Storage(io.to_string()),
            ConfigError::Serde(message) => FacilityError::Config(message),
            ConfigError::BackupNotFound(name) => {
                FacilityError::Config(format!("backup `{name}` not found"))
            }
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(FacilityError::from(err))
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(FacilityError::from(err))
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

impl From<rustyline::error::ReadlineError> for CliError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        CliError::Command(err.to_string())
    }
}
