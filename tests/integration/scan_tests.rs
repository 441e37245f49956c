use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;

use certindex::classify::Institution;
use certindex::registry::{ids, CertificateStatus, CustomerType, DateSource};
use certindex::scanner::ScanError;

use crate::helpers::test_harness::TestHarness;

fn ids_of(registry: &certindex::Registry) -> (BTreeSet<String>, BTreeSet<String>) {
    (
        registry
            .customers()
            .iter()
            .map(|c| c.customer_id.clone())
            .collect(),
        registry
            .certificates()
            .iter()
            .map(|c| c.certificate_id.clone())
            .collect(),
    )
}

#[test]
fn test_scan_sample_tree() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let output = harness.scanner().scan(&harness.base())?;
    let registry = &output.registry;

    assert_eq!(registry.customer_count(), 3);
    // notas.xlsx is not a supported extension
    assert_eq!(registry.certificate_count(), 7);
    assert!(!output.report.has_issues());

    let summary = &output.report.summary;
    assert_eq!(summary.customers_of_type(CustomerType::Person), 2);
    assert_eq!(summary.customers_of_type(CustomerType::Company), 1);
    assert_eq!(summary.certificates_with_status(CertificateStatus::Error), 2);
    assert_eq!(summary.certificates_with_status(CertificateStatus::Ok), 5);
    assert_eq!(summary.certificates_with_status(CertificateStatus::Unknown), 0);

    Ok(())
}

#[test]
fn test_error_prefix_file_classification() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.add_file("Ana Perez", "ERROR_certificado_bps_2024.pdf")?;
    harness.add_file("Ana Perez", "error-dgi.pdf")?;
    harness.add_file("Ana Perez", "sin_ERROR.pdf")?;

    let registry = harness.scan()?;
    for cert in registry.certificates() {
        let expected = cert.filename.to_uppercase().starts_with("ERROR");
        assert_eq!(cert.has_error_prefix, expected, "{}", cert.filename);
        assert_eq!(cert.status == CertificateStatus::Error, expected);
    }

    let bps = registry
        .certificates()
        .iter()
        .find(|c| c.filename == "ERROR_certificado_bps_2024.pdf")
        .unwrap();
    assert_eq!(bps.institution, Some(Institution::Bps));
    assert_eq!(bps.status, CertificateStatus::Error);
    Ok(())
}

#[test]
fn test_filename_dates_and_mtime_fallback() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.add_file("Ana", "iso 2024-11-15.pdf")?;
    harness.add_file("Ana", "dayfirst 15-11-2024.pdf")?;
    harness.add_file("Ana", "compact 20241115.pdf")?;
    harness.add_file("Ana", "sin fecha.pdf")?;

    let registry = harness.scan()?;
    let expected = NaiveDate::from_ymd_opt(2024, 11, 15);

    for cert in registry.certificates() {
        if cert.filename == "sin fecha.pdf" {
            assert!(cert.date.is_some(), "undated file falls back to mtime");
            assert_eq!(cert.date_source, Some(DateSource::FileModified));
        } else {
            assert_eq!(cert.date, expected, "{}", cert.filename);
            assert_eq!(cert.date_source, Some(DateSource::Filename));
        }
    }
    Ok(())
}

#[test]
fn test_rescan_is_idempotent() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;

    let first = harness.scan()?;
    let second = harness.scan()?;

    assert_eq!(ids_of(&first), ids_of(&second));
    Ok(())
}

#[test]
fn test_rescan_through_relative_spelling_keeps_ids() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let base = harness.base();
    let dotted = base.join(".").join("..").join(base.file_name().unwrap());

    let direct = harness.scan()?;
    let respelled = harness.scanner().scan(&dotted)?.registry;

    assert_eq!(ids_of(&direct), ids_of(&respelled));
    Ok(())
}

#[test]
fn test_certificate_ids_follow_relative_paths() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.add_file("Ana", "bps.pdf")?;
    harness.add_file("Ana", "2023/bps.pdf")?;

    let registry = harness.scan()?;
    assert_eq!(registry.certificate_count(), 2);

    let customer = &registry.customers()[0];
    assert_eq!(
        customer.customer_id,
        ids::customer_id("Ana", &harness.base().join("Ana").canonicalize()?)
    );
    let nested = ids::certificate_id(&customer.customer_id, Path::new("2023/bps.pdf"));
    assert!(registry.certificate(&nested).is_some());
    Ok(())
}

#[test]
fn test_scan_records_file_metadata() -> Result<()> {
    let harness = TestHarness::new()?;
    let path = harness.add_file("Ana", "constancia.pdf")?.canonicalize()?;

    let registry = harness.scan()?;
    let cert = &registry.certificates()[0];

    assert_eq!(cert.source_files, vec![path.clone()]);
    assert_eq!(cert.file_path, path);
    assert_eq!(cert.mime_type.as_deref(), Some("application/pdf"));
    assert_eq!(cert.file_size, Some(std::fs::metadata(&path)?.len()));
    assert!(cert.certificate_type.is_none());
    assert!(cert.origin_file_id.is_none());
    Ok(())
}

#[test]
fn test_scan_rejects_missing_base() {
    let harness = TestHarness::new().unwrap();
    let result = harness.scanner().scan(&harness.path().join("nope"));
    assert!(matches!(result, Err(ScanError::BasePathMissing(_))));
}

#[test]
fn test_scan_rejects_file_base() -> Result<()> {
    let harness = TestHarness::new()?;
    let file = harness.path().join("plain.txt");
    std::fs::write(&file, "x")?;

    let result = harness.scanner().scan(&file);
    assert!(matches!(result, Err(ScanError::NotADirectory(_))));
    Ok(())
}

#[test]
fn test_empty_customer_folder_is_kept() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.add_customer("Sin Certificados")?;
    harness.add_file("Otro", "bps.pdf")?;

    let registry = harness.scan()?;
    assert_eq!(registry.customer_count(), 2);
    let empty = registry
        .customers()
        .iter()
        .find(|c| c.name == "Sin Certificados")
        .unwrap();
    assert_eq!(registry.certificates_for(&empty.customer_id).count(), 0);
    Ok(())
}

#[test]
fn test_ignore_patterns_skip_lock_files() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.add_file("Ana", "~$contrato.docx")?;
    harness.add_file("Ana", "contrato.docx")?;

    let registry = harness.scan()?;
    let names: Vec<&str> = registry
        .certificates()
        .iter()
        .map(|c| c.filename.as_str())
        .collect();
    assert_eq!(names, vec!["contrato.docx"]);
    Ok(())
}
