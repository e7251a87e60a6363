use glossary_core::export::{write_all_file, write_language_file};
use glossary_core::{
    derive_key, AutoConfirm, ChangeStatus, Error, JsonFileBackend, Lang, Pipeline, StoreBackend,
};
use std::fs;
use tempfile::tempdir;

const SHEET: &str = "English,Japanese,Malay\n\
Home Title,ホーム,Laman Utama\n\
Welcome Message,ようこそ,\n\
Logout,,Log keluar\n";

#[test]
fn csv_ingest_persists_and_undoes() {
    let dir = tempdir().unwrap();
    let sheet = dir.path().join("glossary.csv");
    fs::write(&sheet, SHEET).unwrap();

    let pipeline = Pipeline::new(JsonFileBackend::new(dir.path().join("data")));
    let report = pipeline.ingest_file(&sheet, &mut AutoConfirm(false)).unwrap();
    assert_eq!(report.outcome.added(), 3);
    assert!(!report.snapshot_taken);

    let store_file = dir.path().join("data").join("translations.json");
    let saved: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&store_file).unwrap()).unwrap();
    assert_eq!(saved["en"]["home_title"], "Home Title");
    assert_eq!(saved["malay"]["logout"], "Log keluar");
    assert!(saved["jp"].get("logout").is_none());

    // Second sheet fills in the missing Japanese text
    let update = dir.path().join("update.txt");
    fs::write(&update, "English\tJapanese\nLogout\tログアウト\n").unwrap();
    let report = pipeline.ingest_file(&update, &mut AutoConfirm(false)).unwrap();
    assert_eq!(report.outcome.changes[0].status, ChangeStatus::Updated);
    assert!(report.snapshot_taken);
    assert_eq!(
        pipeline.current_store().unwrap().get(Lang::Secondary, "logout"),
        Some("ログアウト")
    );

    let restored = pipeline.undo().unwrap();
    assert_eq!(restored.get(Lang::Secondary, "logout"), None);
    assert_eq!(restored.get(Lang::Tertiary, "logout"), Some("Log keluar"));

    let backend = pipeline.into_backend();
    assert!(backend.get_backup().unwrap().is_none());
    assert!(!backend.backup_path().exists());
}

#[test]
fn repeated_ingest_is_idempotent() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(JsonFileBackend::new(dir.path()));

    let text = SHEET.replace(',', "\t");
    pipeline.ingest_paste(&text, &mut AutoConfirm(false)).unwrap();
    let before = pipeline.current_store().unwrap();

    let report = pipeline.ingest_paste(&text, &mut AutoConfirm(false)).unwrap();
    assert!(!report.outcome.has_changes());
    assert!(!report.store_written);
    assert_eq!(pipeline.current_store().unwrap(), before);
}

#[test]
fn cancelled_ingest_leaves_files_byte_identical() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(JsonFileBackend::new(dir.path()));
    pipeline
        .ingest_paste("English\tJapanese\nHome\tホーム", &mut AutoConfirm(false))
        .unwrap();

    let store_file = dir.path().join("translations.json");
    let before = fs::read(&store_file).unwrap();

    let err = pipeline
        .ingest_paste("Source\tTarget\nSettings\t設定", &mut AutoConfirm(false))
        .unwrap_err();
    assert!(matches!(err, Error::UserCancelled { .. }));
    assert_eq!(fs::read(&store_file).unwrap(), before);
    assert!(!dir.path().join("translations.undo.json").exists());
}

#[test]
fn corrupt_store_file_blocks_ingest() {
    let dir = tempdir().unwrap();
    let store_file = dir.path().join("translations.json");
    let corrupt = r#"{"en":{"home":"Home","settings":"Settings",},"jp":{},"malay":{}}"#;
    fs::write(&store_file, corrupt).unwrap();

    let pipeline = Pipeline::new(JsonFileBackend::new(dir.path()));
    assert!(matches!(pipeline.current_store(), Err(Error::CorruptStore { .. })));

    let err = pipeline
        .ingest_paste("English\tJapanese\nHome\tホーム", &mut AutoConfirm(false))
        .unwrap_err();
    assert!(matches!(err, Error::CorruptStore { ref path, .. } if *path == store_file));
    assert_eq!(fs::read_to_string(&store_file).unwrap(), corrupt);
    assert!(!dir.path().join("translations.undo.json").exists());
}

#[test]
fn export_files_round_trip_through_import() {
    let dir = tempdir().unwrap();
    let pipeline = Pipeline::new(JsonFileBackend::new(dir.path().join("data")));
    pipeline
        .ingest_paste(&SHEET.replace(',', "\t"), &mut AutoConfirm(false))
        .unwrap();
    let store = pipeline.current_store().unwrap();

    let jp_file = dir.path().join("out").join("JP.json");
    write_language_file(&store, Lang::Secondary, &jp_file).unwrap();
    write_all_file(&store, dir.path().join("out").join("all_translations.json")).unwrap();

    let loaded = glossary_core::export::read_language_file(&jp_file).unwrap();
    assert_eq!(loaded.get(&derive_key("Welcome Message")).map(String::as_str), Some("ようこそ"));

    pipeline
        .update_store(|s| {
            s.secondary = loaded.clone();
            Ok(())
        })
        .unwrap();
    assert_eq!(pipeline.current_store().unwrap(), store);
}
