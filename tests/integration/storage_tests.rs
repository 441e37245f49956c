use anyhow::Result;
use serde_json::Value;
use std::fs;

use certindex::storage::{RegistryStore, StorageError, FORMAT_VERSION};

use crate::helpers::test_harness::TestHarness;

#[test]
fn test_save_then_load_reproduces_registry() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let registry = harness.scan()?;
    let store = harness.store();

    store.save(&registry, true)?;
    let loaded = store.load()?;

    assert_eq!(loaded, registry);
    Ok(())
}

#[test]
fn test_backup_preserves_previous_document() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();

    let first = harness.scan()?;
    store.save(&first, true)?;
    let original_bytes = fs::read(store.registry_path())?;

    harness.add_file("Nuevo Cliente", "bps 2024-01-01.pdf")?;
    let second = harness.scan()?;
    let outcome = store.save(&second, true)?;

    let backup = outcome.backup_path.expect("second save takes a backup");
    assert_eq!(fs::read(&backup)?, original_bytes);
    assert!(backup.starts_with(store.backup_dir()));
    let name = backup.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("registry_backup_"));
    assert!(name.ends_with(".json"));

    assert_eq!(store.list_backups()?, vec![backup]);
    assert_eq!(store.load()?.customer_count(), 4);
    Ok(())
}

#[test]
fn test_failed_backup_leaves_registry_untouched() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    store.save(&harness.scan()?, true)?;
    let original_bytes = fs::read(store.registry_path())?;

    // A regular file where the backup directory should go.
    fs::write(store.backup_dir(), "not a directory")?;
    harness.add_file("Nuevo Cliente", "bps 2024-01-01.pdf")?;
    let result = store.save(&harness.scan()?, true);

    assert!(matches!(result, Err(StorageError::Io { .. })));
    assert_eq!(fs::read(store.registry_path())?, original_bytes);
    assert_eq!(store.load()?.customer_count(), 3);
    Ok(())
}

#[test]
fn test_save_without_backup() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    let registry = harness.scan()?;

    store.save(&registry, false)?;
    let outcome = store.save(&registry, false)?;

    assert!(outcome.backup_path.is_none());
    assert!(store.list_backups()?.is_empty());
    Ok(())
}

#[test]
fn test_repeated_backups_get_distinct_names() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    let registry = harness.scan()?;

    store.save(&registry, true)?;
    for _ in 0..3 {
        store.save(&registry, true)?;
    }

    assert_eq!(store.list_backups()?.len(), 3);
    Ok(())
}

#[test]
fn test_document_layout() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    store.save(&harness.scan()?, false)?;

    let doc: Value = serde_json::from_str(&fs::read_to_string(store.registry_path())?)?;
    assert_eq!(doc["format_version"], FORMAT_VERSION);
    assert_eq!(doc["total_customers"], 3);
    assert_eq!(doc["total_certificates"], 7);

    let types: Vec<&str> = doc["customers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["customer_type"].as_str().unwrap())
        .collect();
    assert!(types.iter().all(|t| *t == "PERSON" || *t == "COMPANY"));

    let cert = &doc["certificates"][0];
    assert!(cert["status"].as_str().is_some());
    assert!(cert["source_files"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
    Ok(())
}

fn edit_document(store: &RegistryStore, edit: impl FnOnce(&mut Value)) -> Result<()> {
    let mut doc: Value = serde_json::from_str(&fs::read_to_string(store.registry_path())?)?;
    edit(&mut doc);
    fs::write(store.registry_path(), serde_json::to_string_pretty(&doc)?)?;
    Ok(())
}

#[test]
fn test_load_rejects_dangling_customer_reference() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    store.save(&harness.scan()?, false)?;

    edit_document(&store, |doc| {
        doc["certificates"][0]["customer_id"] = Value::from("missing");
    })?;

    assert!(matches!(store.load(), Err(StorageError::Integrity { .. })));
    Ok(())
}

#[test]
fn test_load_rejects_duplicate_certificate() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    store.save(&harness.scan()?, false)?;

    edit_document(&store, |doc| {
        let first = doc["certificates"][0].clone();
        doc["certificates"].as_array_mut().unwrap().push(first);
    })?;

    assert!(matches!(store.load(), Err(StorageError::Integrity { .. })));
    Ok(())
}

#[test]
fn test_load_rejects_malformed_document() -> Result<()> {
    let harness = TestHarness::new()?;
    let store = harness.store();
    fs::create_dir_all(harness.data_dir())?;
    fs::write(store.registry_path(), "{ not json")?;

    assert!(matches!(store.load(), Err(StorageError::Serialization { .. })));
    Ok(())
}

#[test]
fn test_load_rejects_newer_format() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    store.save(&harness.scan()?, false)?;

    edit_document(&store, |doc| {
        doc["format_version"] = Value::from(FORMAT_VERSION + 1);
    })?;

    assert!(matches!(
        store.load(),
        Err(StorageError::UnsupportedVersion { .. })
    ));
    Ok(())
}

#[test]
fn test_load_tolerates_stale_totals() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    store.save(&harness.scan()?, false)?;

    edit_document(&store, |doc| {
        doc["total_certificates"] = Value::from(999);
    })?;

    assert_eq!(store.load()?.certificate_count(), 7);
    Ok(())
}

#[test]
fn test_report_is_denormalized_and_sorted() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    let registry = harness.scan()?;
    store.save(&registry, false)?;

    let path = store.export_report(&registry)?;
    assert_ne!(path, store.registry_path());

    let report: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(report["summary"]["total_customers"], 3);
    assert_eq!(report["summary"]["total_errors"], 2);

    let names: Vec<&str> = report["customers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ana Perez", "Juan Gomez", "Transportes del Sur S.A."]);

    let ana = &report["customers"][0];
    assert_eq!(ana["type"], "PERSON");
    assert_eq!(ana["total_certificates"], 3);
    assert!(ana["created_at"].as_str().unwrap().ends_with(" UTC"));
    assert!(ana["certificates"].as_array().unwrap().len() == 3);

    // The registry document still loads after exporting.
    assert_eq!(store.load()?, registry);
    Ok(())
}

#[test]
fn test_statistics() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let store = harness.store();
    let registry = harness.scan()?;

    let stats = store.statistics(&registry);
    assert_eq!(stats.total_customers, 3);
    assert_eq!(stats.total_certificates, 7);
    assert_eq!(stats.certificates_by_institution.values().sum::<usize>(), 6);
    assert_eq!(stats.unclassified_certificates, 1);
    assert_eq!(stats.dates_from_filename + stats.dates_from_metadata, 7);
    assert_eq!(stats.top_customers[0].name, "Ana Perez");
    Ok(())
}
