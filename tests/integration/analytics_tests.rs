use anyhow::Result;

use certindex::analytics::{Analytics, MatchKind};
use certindex::classify::Institution;

use crate::helpers::test_harness::TestHarness;

#[test]
fn test_institution_analysis_across_customers() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.add_file("Cliente A", "certificado bps 2024-01-10.pdf")?;
    harness.add_file("Cliente A", "ERROR bps 2024-02-10.pdf")?;
    harness.add_file("Cliente B", "bps 2024-03-10.pdf")?;

    let registry = harness.scan()?;
    let analysis = Analytics::new(&registry).institution_analysis();

    let bps = &analysis[&Institution::Bps];
    assert_eq!(bps.customer_count, 2);
    assert_eq!(bps.certificate_count, 3);
    assert_eq!(bps.error_count, 1);
    assert!((bps.error_rate - 1.0 / 3.0).abs() < 1e-12);
    Ok(())
}

#[test]
fn test_search_spans_customers() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let registry = harness.scan()?;

    let results = Analytics::new(&registry).search("BPS");
    assert_eq!(results.len(), 3);
    assert!(results
        .iter()
        .all(|c| c.filename.to_lowercase().contains("bps")));

    let owners: std::collections::BTreeSet<&str> =
        results.iter().map(|c| c.customer_id.as_str()).collect();
    assert_eq!(owners.len(), 2);
    Ok(())
}

#[test]
fn test_find_customer_and_history() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let registry = harness.scan()?;
    let analytics = Analytics::new(&registry);

    let matches = analytics.find_customers_by_name("ana perez");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].kind, MatchKind::Exact);

    let ana = &matches[0].customer.customer_id;
    let history = analytics.certificate_history(ana);
    assert_eq!(history.len(), 3);
    for pair in history.windows(2) {
        assert!(pair[0].date >= pair[1].date);
    }

    let errors = analytics.error_history(ana);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].filename, "ERROR_certificado_bps_2024.pdf");
    Ok(())
}

#[test]
fn test_customer_summary_for_empty_folder() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.add_customer("Cliente Vacio")?;

    let registry = harness.scan()?;
    let analytics = Analytics::new(&registry);
    let id = &registry.customers()[0].customer_id;

    let summary = analytics.customer_summary(id).unwrap();
    assert_eq!(summary.total_certificates, 0);
    assert_eq!(summary.error_rate, 0.0);

    let timeline = analytics.timeline_analysis(id).unwrap();
    assert_eq!(timeline.dated_count, 0);
    assert!(timeline.span_days.is_none());
    Ok(())
}

#[test]
fn test_suspected_duplicates_from_scan() -> Result<()> {
    let harness = TestHarness::new()?;
    harness.add_file("Ana", "Constancia BPS 2024-01-10.pdf")?;
    harness.add_file("Ana", "copias/constancia bps 2024-01-10.pdf")?;
    harness.add_file("Ana", "Constancia DGI 2024-01-10.pdf")?;

    let registry = harness.scan()?;
    let clusters = Analytics::new(&registry).find_suspected_duplicates();

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].certificates.len(), 2);
    assert_eq!(clusters[0].key.institution, Some(Institution::Bps));
    // Advisory only
    assert_eq!(registry.certificate_count(), 3);
    Ok(())
}

#[test]
fn test_error_report_from_scan() -> Result<()> {
    let harness = TestHarness::with_sample_tree()?;
    let registry = harness.scan()?;
    let report = Analytics::new(&registry).error_report();

    assert_eq!(report.total_errors, 2);
    assert_eq!(report.customers_with_errors, 2);
    assert_eq!(report.customers.len(), 3);
    assert_eq!(report.customers[2].name, "Juan Gomez");
    assert_eq!(report.customers[2].error_count, 0);
    // Transportes: 1 of 2, Ana: 1 of 3
    assert_eq!(report.customers[0].name, "Transportes del Sur S.A.");
    Ok(())
}
