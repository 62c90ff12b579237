use mbay_core::{
    storage::CalculationStore, ChargeRequest, CoreError, RateTable, ReserveFundService,
};
use mbay_domain::{Area, CalculationHistory, PropertyType};
use mbay_storage_json::JsonCalculationStore;
use tempfile::tempdir;

fn sample_history(name: &str) -> CalculationHistory {
    let table = RateTable::rfs_2025();
    let request = ChargeRequest::new(
        "3",
        PropertyType::Apartment,
        Area::sqm(199.0).expect("area"),
        2025,
    );
    let mut history = CalculationHistory::new(name);
    history.push(
        ReserveFundService::quote(&table, &request)
            .expect("quote")
            .to_record(),
    );
    history
}

#[test]
fn json_store_can_save_and_load_history() {
    let dir = tempdir().expect("tempdir");
    let store = JsonCalculationStore::at_data_root(dir.path()).expect("create store");
    let history = sample_history("Quarterly Review");

    store
        .save_history("Quarterly Review", &history)
        .expect("save history");
    let loaded = store.load_history("Quarterly Review").expect("load history");

    assert_eq!(loaded.name, "Quarterly Review");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.records[0].id, history.records[0].id);
    let path = store.history_path("Quarterly Review");
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("quarterly_review.json"));
    assert!(!path.with_extension("json.tmp").exists());
    assert_eq!(store.list_histories().unwrap(), vec!["quarterly_review".to_string()]);

    let metadata = store.list_metadata().expect("metadata");
    assert_eq!(metadata[0].record_count, 1);
    assert!((metadata[0].total_annual - 764.16).abs() < 1e-6);
}

#[test]
fn missing_history_is_reported() {
    let dir = tempdir().expect("tempdir");
    let store = JsonCalculationStore::at_data_root(dir.path()).expect("create store");

    assert!(matches!(
        store.load_history("nothing"),
        Err(CoreError::HistoryNotFound(_))
    ));
    assert!(store.load_or_new("nothing").expect("new").is_empty());
    assert!(matches!(
        store.delete_history("nothing"),
        Err(CoreError::HistoryNotFound(_))
    ));
}

#[test]
fn json_store_creates_and_restores_backups() {
    let dir = tempdir().expect("tempdir");
    let store = JsonCalculationStore::at_data_root(dir.path()).expect("create store");

    let original = sample_history("default");
    store.save_history("default", &original).expect("save");
    let info = store
        .backup_history("default", &original, Some("Before import"))
        .expect("backup");
    assert!(info.id.contains("__before-import"));

    let mut changed = original.clone();
    changed.records.clear();
    store.save_history("default", &changed).expect("overwrite");

    let backups = store.list_backups("default").expect("list backups");
    assert!(backups.iter().any(|entry| entry.id == info.id));
    assert_eq!(backups.len(), 2, "explicit backup plus the pre-overwrite copy");

    let restored = store.restore_backup(&info).expect("restore backup");
    assert_eq!(restored.len(), 1);
    assert_eq!(store.load_history("default").expect("load").len(), 1);
}

#[test]
fn restoring_keeps_a_copy_of_the_live_history() {
    let dir = tempdir().expect("tempdir");
    let store = JsonCalculationStore::at_data_root(dir.path()).expect("create store");

    let original = sample_history("default");
    store.save_history("default", &original).expect("save");
    let info = store
        .backup_history("default", &original, None)
        .expect("backup");

    let mut changed = original.clone();
    changed.records.clear();
    store.save_history("default", &changed).expect("overwrite");
    assert_eq!(store.list_backups("default").expect("list").len(), 2);

    store.restore_backup(&info).expect("restore backup");
    let backups = store.list_backups("default").expect("list");
    assert_eq!(backups.len(), 3);
    let pre_restore = backups
        .iter()
        .find(|entry| entry.id.contains("__pre-restore"))
        .expect("pre-restore copy");
    let kept = store
        .load_history_from_path(&pre_restore.path)
        .expect("load copy");
    assert!(kept.is_empty());
    assert_eq!(store.load_history("default").expect("load").len(), 1);
}

#[test]
fn names_sharing_a_file_do_not_overwrite_each_other() {
    let dir = tempdir().expect("tempdir");
    let store = JsonCalculationStore::at_data_root(dir.path()).expect("create store");

    store
        .save_history("villas 2025", &sample_history("villas 2025"))
        .expect("save");
    let clash = store.save_history("villas_2025", &sample_history("villas_2025"));
    assert!(matches!(clash, Err(CoreError::Storage(_))));

    let kept = store.load_history("villas 2025").expect("load");
    assert_eq!(kept.name, "villas 2025");
    assert_eq!(store.list_backups("villas 2025").expect("list").len(), 0);

    store
        .save_history("Villas 2025", &sample_history("Villas 2025"))
        .expect("same book, different case");
}

#[test]
fn backups_are_pruned_to_retention() {
    let dir = tempdir().expect("tempdir");
    let store = JsonCalculationStore::with_retention(
        dir.path().join("history"),
        dir.path().join("backups"),
        2,
    )
    .expect("create store");

    let history = sample_history("pruned");
    for _ in 0..4 {
        store.backup_history("pruned", &history, None).expect("backup");
    }
    assert_eq!(store.list_backups("pruned").expect("list").len(), 2);
}

#[test]
fn deleting_history_removes_the_file() {
    let dir = tempdir().expect("tempdir");
    let store = JsonCalculationStore::at_data_root(dir.path()).expect("create store");
    store
        .save_history("scratch", &sample_history("scratch"))
        .expect("save");
    store.delete_history("scratch").expect("delete");
    assert!(!store.exists("scratch"));
    assert!(store.list_histories().unwrap().is_empty());
}
