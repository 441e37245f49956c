use anyhow::Result;
use std::path::PathBuf;

use certindex::commands::{self, CommandContext};
use certindex::registry::{Registry, RegistryMetadata};
use certindex::{Config, ValidationError};

use crate::helpers::test_harness::TestHarness;

fn context(harness: &TestHarness) -> CommandContext {
    CommandContext::new(
        harness.path().to_path_buf(),
        Config::default(),
        Some(PathBuf::from("data")),
    )
}

#[test]
fn test_scan_command_then_queries() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let ctx = context(&harness);

    commands::scan::run(&ctx, &harness.base(), false, false)?;
    assert!(ctx.store.exists());
    assert!(ctx.store.report_path().exists());

    commands::stats::run(&ctx, false)?;
    commands::customers::list(&ctx)?;
    commands::customers::show(&ctx, "gomez")?;
    commands::search::run(&ctx, "bps", 2)?;
    commands::errors::run(&ctx)?;
    commands::institutions::run(&ctx)?;
    commands::duplicates::run(&ctx)?;
    Ok(())
}

#[test]
fn test_rescan_backs_up_previous_registry() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let ctx = context(&harness);

    commands::scan::run(&ctx, &harness.base(), false, true)?;
    assert!(!ctx.store.report_path().exists());

    harness.add_file("Maria Silva", "ute 2024-06-01.pdf")?;
    commands::scan::run(&ctx, &harness.base(), false, true)?;

    assert_eq!(ctx.store.list_backups()?.len(), 1);
    assert_eq!(ctx.load_registry()?.customer_count(), 4);
    Ok(())
}

#[test]
fn test_scan_command_fails_on_missing_base() -> Result<()> {
    let harness = TestHarness::new()?;
    let ctx = context(&harness);

    let result = commands::scan::run(&ctx, &harness.path().join("missing"), false, false);
    assert!(result.is_err());
    assert!(!ctx.store.exists());
    Ok(())
}

#[test]
fn test_queries_fail_without_registry() -> Result<()> {
    let harness = TestHarness::new()?;
    let ctx = context(&harness);

    assert!(commands::stats::run(&ctx, false).is_err());
    assert!(commands::customers::show(&ctx, "ana").is_err());
    Ok(())
}

#[test]
fn test_show_unknown_customer_fails() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let ctx = context(&harness);
    commands::scan::run(&ctx, &harness.base(), true, true)?;

    assert!(commands::customers::show(&ctx, "nadie").is_err());
    Ok(())
}

#[test]
fn test_export_to_custom_path() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let ctx = context(&harness);
    commands::scan::run(&ctx, &harness.base(), true, true)?;

    let output = harness.path().join("exports").join("report.json");
    commands::export::run(&ctx, Some(&output))?;
    assert!(output.exists());

    let registry_path = ctx.store.registry_path().to_path_buf();
    assert!(commands::export::run(&ctx, Some(&registry_path)).is_err());
    assert!(ctx.load_registry().is_ok());
    Ok(())
}

#[test]
fn test_merge_of_separate_scans() -> Result<()> {
    let left = TestHarness::new()?;
    left.add_file("Ana", "bps.pdf")?;
    let right = TestHarness::new()?;
    right.add_file("Luis", "dgi.pdf")?;

    let merged = left
        .scan()?
        .merge(right.scan()?, RegistryMetadata::new("merged"))?;
    assert_eq!(merged.customer_count(), 2);
    assert_eq!(merged.certificate_count(), 2);

    let again = left.scan()?;
    let err = merged
        .merge(again, RegistryMetadata::new("merged"))
        .unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateCustomer(_)));
    Ok(())
}

#[test]
fn test_empty_base_yields_empty_registry() -> Result<()> {
    let harness = TestHarness::new()?;
    let registry: Registry = harness.scan()?;
    assert!(registry.is_empty());
    assert_eq!(registry.certificate_count(), 0);
    Ok(())
}
