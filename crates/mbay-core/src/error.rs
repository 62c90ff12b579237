use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Unknown zone: {0}")]
    UnknownZone(String),
    #[error("No rate data for zone {zone} / {property_type}")]
    RateNotFound {
        zone: String,
        property_type: String,
    },
    #[error("Unit not found: {0}")]
    UnitNotFound(String),
    #[error("Unit already registered: {0}")]
    DuplicateUnit(String),
    #[error("Incomplete selection: {0}")]
    Selection(String),
    #[error("History not found: {0}")]
    HistoryNotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<mbay_domain::AreaError> for CoreError {
    fn from(err: mbay_domain::AreaError) -> Self {
        CoreError::Validation(err.to_string())
    }
}
