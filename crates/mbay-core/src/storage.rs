use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use mbay_domain::CalculationHistory;

use crate::CoreError;

/// Describes a persisted backup of a calculation history.
#[derive(Debug, Clone)]
pub struct HistoryBackupInfo {
    pub history: String,
    pub id: String,
    pub created_at: String,
    pub path: PathBuf,
}

/// Abstraction over persistence backends for saved calculations.
pub trait CalculationStore: Send + Sync {
    fn save_history(&self, name: &str, history: &CalculationHistory) -> Result<(), CoreError>;
    fn load_history(&self, name: &str) -> Result<CalculationHistory, CoreError>;
    fn list_histories(&self) -> Result<Vec<String>, CoreError>;
    fn delete_history(&self, name: &str) -> Result<(), CoreError>;
    fn save_history_to_path(
        &self,
        history: &CalculationHistory,
        path: &Path,
    ) -> Result<(), CoreError>;
    fn load_history_from_path(&self, path: &Path) -> Result<CalculationHistory, CoreError>;
    fn backup_history(
        &self,
        name: &str,
        history: &CalculationHistory,
        note: Option<&str>,
    ) -> Result<HistoryBackupInfo, CoreError>;
    fn list_backups(&self, name: &str) -> Result<Vec<HistoryBackupInfo>, CoreError>;
    fn restore_backup(&self, backup: &HistoryBackupInfo) -> Result<CalculationHistory, CoreError>;
}

/// Flags records that could not have come from a calculator.
pub fn history_warnings(history: &CalculationHistory) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut warnings = Vec::new();

    for record in &history.records {
        if !seen.insert(record.id) {
            warnings.push(format!("record {} appears more than once", record.id));
        }
        if !(record.property_size.is_finite() && record.property_size > 0.0) {
            warnings.push(format!(
                "record {} has invalid property size {}",
                record.id, record.property_size
            ));
        }
        if !record.total_annual.is_finite() || record.total_annual < 0.0 {
            warnings.push(format!(
                "record {} has invalid annual total {}",
                record.id, record.total_annual
            ));
        }
        if (record.monthly * 12.0 - record.total_annual).abs() > 1e-6 {
            warnings.push(format!(
                "record {} monthly instalment does not match its annual total",
                record.id
            ));
        }
    }
    warnings
}
