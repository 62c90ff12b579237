//! JSON-file persistence for saved calculation histories.

use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use mbay_core::{
    storage::{history_warnings, CalculationStore, HistoryBackupInfo},
    CoreError,
};
use mbay_domain::CalculationHistory;
use tracing::{info, warn};

const FILE_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;
const PRE_RESTORE_NOTE: &str = "pre-restore";

/// Stores each history book as `<histories>/<slug>.json`, with backups under
/// `<backups>/<slug>/`.
#[derive(Debug, Clone)]
pub struct JsonCalculationStore {
    histories_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

/// Summary row for listing saved histories.
#[derive(Debug, Clone)]
pub struct HistoryMetadata {
    pub slug: String,
    pub name: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub record_count: usize,
    pub total_annual: f64,
}

impl JsonCalculationStore {
    pub fn new(histories_dir: PathBuf, backups_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(histories_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        histories_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        fs::create_dir_all(&histories_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            histories_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    /// Uses `<root>/history` and `<root>/history/backups`.
    pub fn at_data_root(root: &Path) -> Result<Self, CoreError> {
        let histories_dir = root.join("history");
        let backups_dir = histories_dir.join("backups");
        Self::new(histories_dir, backups_dir)
    }

    pub fn history_path(&self, name: &str) -> PathBuf {
        self.histories_dir
            .join(format!("{}.{}", canonical_name(name), FILE_EXTENSION))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.history_path(name).is_file()
    }

    /// Loads `name`, or starts an empty history when nothing was saved under it.
    pub fn load_or_new(&self, name: &str) -> Result<CalculationHistory, CoreError> {
        if self.exists(name) {
            self.load_history(name)
        } else {
            Ok(CalculationHistory::new(name))
        }
    }

    pub fn list_metadata(&self) -> Result<Vec<HistoryMetadata>, CoreError> {
        let mut rows = Vec::new();
        for slug in self.list_histories()? {
            let history = self.load_history(&slug)?;
            rows.push(HistoryMetadata {
                path: self.history_path(&slug),
                slug,
                name: history.name.clone(),
                created_at: history.created_at,
                updated_at: history.updated_at,
                record_count: history.len(),
                total_annual: history.records.iter().map(|r| r.total_annual).sum(),
            });
        }
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    fn backup_dir(&self, name: &str) -> PathBuf {
        self.backups_dir.join(canonical_name(name))
    }

    fn write_backup(
        &self,
        name: &str,
        contents: &str,
        note: Option<&str>,
    ) -> Result<HistoryBackupInfo, CoreError> {
        let slug = canonical_name(name);
        let dir = self.backup_dir(name);
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let mut stem = format!("{slug}_{timestamp}");
        if let Some(label) = sanitize_note(note) {
            stem.push_str("__");
            stem.push_str(&label);
        }
        let mut file_name = format!("{stem}.{FILE_EXTENSION}");
        let mut attempt = 1;
        while dir.join(&file_name).exists() {
            file_name = format!("{stem}_{attempt:02}.{FILE_EXTENSION}");
            attempt += 1;
        }
        let path = dir.join(&file_name);
        write_atomic(&path, contents)?;
        self.prune_backups(name)?;
        Ok(HistoryBackupInfo {
            history: slug,
            id: file_name,
            created_at: timestamp,
            path,
        })
    }

    fn prune_backups(&self, name: &str) -> Result<(), CoreError> {
        for stale in self.list_backups(name)?.into_iter().skip(self.retention) {
            if let Err(err) = fs::remove_file(&stale.path) {
                warn!(backup = %stale.id, %err, "failed to prune history backup");
            }
        }
        Ok(())
    }
}

impl CalculationStore for JsonCalculationStore {
    fn save_history(&self, name: &str, history: &CalculationHistory) -> Result<(), CoreError> {
        let path = self.history_path(name);
        if path.exists() {
            let previous = fs::read_to_string(&path)?;
            ensure_same_book(&path, &previous, &history.name)?;
            self.write_backup(name, &previous, None)?;
        }
        save_history_to_path(history, &path)?;
        info!(history = %name, records = history.len(), "calculation history saved");
        Ok(())
    }

    fn load_history(&self, name: &str) -> Result<CalculationHistory, CoreError> {
        let path = self.history_path(name);
        if !path.exists() {
            return Err(CoreError::HistoryNotFound(name.to_string()));
        }
        let history = load_history_from_path(&path)?;
        for warning in history_warnings(&history) {
            warn!(history = %name, "{warning}");
        }
        Ok(history)
    }

    fn list_histories(&self) -> Result<Vec<String>, CoreError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.histories_dir)? {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_history(&self, name: &str) -> Result<(), CoreError> {
        let path = self.history_path(name);
        if !path.exists() {
            return Err(CoreError::HistoryNotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }

    fn save_history_to_path(
        &self,
        history: &CalculationHistory,
        path: &Path,
    ) -> Result<(), CoreError> {
        save_history_to_path(history, path)
    }

    fn load_history_from_path(&self, path: &Path) -> Result<CalculationHistory, CoreError> {
        load_history_from_path(path)
    }

    fn backup_history(
        &self,
        name: &str,
        history: &CalculationHistory,
        note: Option<&str>,
    ) -> Result<HistoryBackupInfo, CoreError> {
        self.write_backup(name, &serialize_history(history)?, note)
    }

    fn list_backups(&self, name: &str) -> Result<Vec<HistoryBackupInfo>, CoreError> {
        let dir = self.backup_dir(name);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let slug = canonical_name(name);
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let created_at = backup_timestamp(&slug, file_name)
                .map(|stamp| stamp.format(BACKUP_TIMESTAMP_FORMAT).to_string())
                .unwrap_or_default();
            entries.push(HistoryBackupInfo {
                history: slug.clone(),
                id: file_name.to_string(),
                created_at,
                path: path.clone(),
            });
        }
        entries.sort_by(|a, b| {
            Reverse((&a.created_at, &a.id)).cmp(&Reverse((&b.created_at, &b.id)))
        });
        Ok(entries)
    }

    fn restore_backup(&self, backup: &HistoryBackupInfo) -> Result<CalculationHistory, CoreError> {
        if !backup.path.exists() {
            return Err(CoreError::Storage(format!("backup `{}` not found", backup.id)));
        }
        let history = load_history_from_path(&backup.path)?;
        let live = self.history_path(&backup.history);
        if live.exists() {
            let current = fs::read_to_string(&live)?;
            self.write_backup(&backup.history, &current, Some(PRE_RESTORE_NOTE))?;
        }
        save_history_to_path(&history, &live)?;
        info!(history = %backup.history, backup = %backup.id, "history restored from backup");
        Ok(history)
    }
}

/// Writes a history to an arbitrary path through a temporary file.
pub fn save_history_to_path(history: &CalculationHistory, path: &Path) -> Result<(), CoreError> {
    write_atomic(path, &serialize_history(history)?)
}

pub fn load_history_from_path(path: &Path) -> Result<CalculationHistory, CoreError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))
}

/// Different names can slug to the same file; only the book already stored
/// there may overwrite it.
fn ensure_same_book(path: &Path, stored: &str, incoming: &str) -> Result<(), CoreError> {
    let Ok(existing) = serde_json::from_str::<CalculationHistory>(stored) else {
        return Ok(());
    };
    if existing.name.trim().eq_ignore_ascii_case(incoming.trim()) {
        return Ok(());
    }
    warn!(stored = %existing.name, incoming = %incoming, path = %path.display(), "history file name clash");
    Err(CoreError::Storage(format!(
        "history `{}` would overwrite `{}` in {}; choose another name",
        incoming,
        existing.name,
        path.display()
    )))
}

fn canonical_name(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .collect();
    if slug.trim_matches('_').is_empty() {
        "history".into()
    } else {
        slug
    }
}

fn sanitize_note(note: Option<&str>) -> Option<String> {
    let mut sanitized = String::new();
    for ch in note?.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            sanitized.push(ch.to_ascii_lowercase());
        } else if !sanitized.is_empty() && !sanitized.ends_with('-') {
            sanitized.push('-');
        }
    }
    let trimmed = sanitized.trim_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn backup_timestamp(slug: &str, file_name: &str) -> Option<DateTime<Utc>> {
    let rest = file_name.strip_prefix(slug)?.strip_prefix('_')?;
    let stamp = rest.get(..TIMESTAMP_LEN)?;
    NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn serialize_history(history: &CalculationHistory) -> Result<String, CoreError> {
    serde_json::to_string_pretty(history).map_err(|err| CoreError::Serde(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_slugged() {
        assert_eq!(canonical_name(" Zone 3 / 2025 "), "zone_3___2025");
        assert_eq!(canonical_name("q1-review"), "q1-review");
        assert_eq!(canonical_name("///"), "history");
    }

    #[test]
    fn backup_timestamps_follow_the_slug() {
        let stamp = backup_timestamp("default", "default_20250102_030405__pre-import.json")
            .expect("timestamp");
        assert_eq!(stamp.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-01-02 03:04:05");
        assert!(backup_timestamp("default", "other_20250102_030405.json").is_none());
    }
}
