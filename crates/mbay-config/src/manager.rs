use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::{Config, ConfigError};

const BACKUP_PREFIX: &str = "config";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";

/// A configuration snapshot found in the backups directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBackup {
    pub file_name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

/// Loads, saves and backs up [`Config`] under a data root.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
    backups_dir: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf, backups_dir: PathBuf) -> Self {
        Self {
            config_path,
            backups_dir,
        }
    }

    /// Lays out `<base>/config/config.json` and `<base>/config/backups/`.
    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        let backups_dir = config_dir.join("backups");
        fs::create_dir_all(&backups_dir)?;
        Ok(Self::new(config_dir.join("config.json"), backups_dir))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Returns the stored config, or defaults when nothing has been saved yet.
    pub fn load(&self) -> Result<Config, ConfigError> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.config_path, &json)
    }

    /// Writes a timestamped copy of `config`; returns the backup file name.
    pub fn backup(&self, config: &Config, note: Option<&str>) -> Result<String, ConfigError> {
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT);
        let mut name = format!("{BACKUP_PREFIX}_{timestamp}");
        if let Some(label) = sanitize_note(note) {
            name.push_str("__");
            name.push_str(&label);
        }
        name.push('.');
        name.push_str(BACKUP_EXTENSION);
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.backups_dir.join(&name), &json)?;
        Ok(name)
    }

    pub fn restore(&self, backup_name: &str) -> Result<Config, ConfigError> {
        let path = self.backups_dir.join(backup_name);
        if !path.is_file() {
            return Err(ConfigError::BackupNotFound(backup_name.to_string()));
        }
        let data = fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&data)?;
        self.save(&config)?;
        Ok(config)
    }

    /// Backups, newest first.
    pub fn list_backups(&self) -> Result<Vec<ConfigBackup>, ConfigError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                backups.push(describe_backup(name));
            }
        }
        backups.sort_by_key(|backup| Reverse(backup.created_at));
        Ok(backups)
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

fn describe_backup(file_name: &str) -> ConfigBackup {
    let stem = file_name
        .strip_suffix(BACKUP_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(file_name);
    let body = stem
        .strip_prefix(BACKUP_PREFIX)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(stem);
    let (stamp, note) = match body.split_once("__") {
        Some((stamp, note)) => (stamp, Some(note.to_string())),
        None => (body, None),
    };
    let created_at = NaiveDateTime::parse_from_str(stamp, BACKUP_TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc));
    ConfigBackup {
        file_name: file_name.to_string(),
        created_at,
        note,
    }
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

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_reduced_to_slugs() {
        assert_eq!(sanitize_note(Some("  Before 2026 rates! ")), Some("before-2026-rates".into()));
        assert_eq!(sanitize_note(Some("***")), None);
        assert_eq!(sanitize_note(None), None);
    }

    #[test]
    fn backup_names_are_parsed() {
        let backup = describe_backup("config_20250301_101500__pre-import.json");
        assert_eq!(backup.note.as_deref(), Some("pre-import"));
        let created = backup.created_at.expect("timestamp");
        assert_eq!(created.format("%Y-%m-%d %H:%M:%S").to_string(), "2025-03-01 10:15:00");

        let unnamed = describe_backup("notes.json");
        assert_eq!(unnamed.created_at, None);
    }
}
