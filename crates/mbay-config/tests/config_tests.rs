use mbay_config::{Config, ConfigError, ConfigManager, Theme};
use tempfile::tempdir;

#[test]
fn default_config_bills_in_omani_rial() {
    let cfg = Config::default();

    assert_eq!(cfg.currency, "OMR");
    assert_eq!(cfg.rate_table, "rfs-2025");
    assert!(!cfg.include_vat_in_reserve);
    assert!(cfg.resolve_data_root().ends_with("MuscatBay"));
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    assert!(manager.backups_dir().is_dir());
    assert_eq!(manager.load().expect("load"), Config::default());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"), dir.path().join("backups"));

    let mut cfg = Config::default();
    cfg.set("year", "2027").expect("year");
    cfg.set("reserve-vat", "yes").expect("vat");
    cfg.set("theme", "plain").expect("theme");

    manager.save(&cfg).expect("save config");
    assert!(!dir.path().join("config.json.tmp").exists());
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded.default_year, Some(2027));
    assert!(loaded.include_vat_in_reserve);
    assert_eq!(loaded.theme, Theme::Plain);
}

#[test]
fn unknown_settings_and_bad_values_are_rejected() {
    let mut cfg = Config::default();
    assert!(cfg.set("volume", "11").is_err());
    assert!(cfg.set("color", "maybe").is_err());
    assert!(cfg.set("year", "soon").is_err());
    assert_eq!(cfg, Config::default());
}

#[test]
fn unknown_theme_falls_back_to_default() {
    let json = r#"{"locale":"en-OM","currency":"OMR","theme":"neon"}"#;
    let cfg: Config = serde_json::from_str(json).expect("parse");
    assert_eq!(cfg.theme, Theme::Iconic);
    assert_eq!(cfg.rate_table, "rfs-2025");
    assert!(cfg.ui_color_enabled);
}

#[test]
fn backups_can_be_listed_and_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.set("table", "rfs-2021-sqft").expect("table");
    let name = manager.backup(&cfg, Some("Study rates")).expect("backup");
    assert!(name.ends_with("__study-rates.json"));

    let backups = manager.list_backups().expect("list");
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0].note.as_deref(), Some("study-rates"));
    assert!(backups[0].created_at.is_some());

    let restored = manager.restore(&name).expect("restore");
    assert_eq!(restored.rate_table, "rfs-2021-sqft");
    assert_eq!(manager.load().expect("load").rate_table, "rfs-2021-sqft");

    assert!(matches!(
        manager.restore("config_missing.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
}
