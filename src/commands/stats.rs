//! Stats command for displaying registry statistics and metrics

use anyhow::Result;

use super::{display_path, truncate, CommandContext};
use crate::metrics::{gather_metrics, CERTIFICATES_INDEXED, CUSTOMERS_INDEXED};
use crate::registry::{CertificateStatus, CustomerType};

/// Run the stats command
///
/// # Arguments
/// * `prometheus` - If true, output in Prometheus text format
pub fn run(ctx: &CommandContext, prometheus: bool) -> Result<()> {
    let registry = ctx.load_registry()?;

    CUSTOMERS_INDEXED.set(registry.customer_count() as f64);
    CERTIFICATES_INDEXED.set(registry.certificate_count() as f64);

    if prometheus {
        print!("{}", gather_metrics());
        return Ok(());
    }

    let stats = ctx.store.statistics(&registry);
    let metadata = registry.metadata();

    println!("Registry Statistics");
    println!("===================\n");

    println!("Snapshot:");
    println!("  Source:       {}", metadata.source);
    println!(
        "  Generated at: {}",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    println!("Customers:      {}", stats.total_customers);
    println!("  Persons:      {}", stats.customers_of_type(CustomerType::Person));
    println!("  Companies:    {}", stats.customers_of_type(CustomerType::Company));
    println!();

    println!("Certificates:   {}", stats.total_certificates);
    for status in [
        CertificateStatus::Ok,
        CertificateStatus::Error,
        CertificateStatus::Unknown,
    ] {
        let count = stats.certificates_with_status(status);
        if count > 0 || status != CertificateStatus::Unknown {
            println!("  {:<12}{}", format!("{}:", status), count);
        }
    }
    println!();

    println!("By institution:");
    for (institution, count) in &stats.certificates_by_institution {
        println!("  {:<12}{}", format!("{}:", institution), count);
    }
    println!("  {:<12}{}", "(none):", stats.unclassified_certificates);
    println!();

    println!("Dates:");
    println!("  From filename:      {}", stats.dates_from_filename);
    println!("  From file metadata: {}", stats.dates_from_metadata);
    println!();

    if !stats.top_customers.is_empty() {
        println!("Top customers:");
        for entry in &stats.top_customers {
            println!(
                "  {:<40} {:>6}",
                truncate(&entry.name, 38),
                entry.certificate_count
            );
        }
        println!();
    }

    let backups = ctx.store.list_backups()?;
    println!("Storage:");
    println!(
        "  Registry: {}",
        display_path(ctx.store.registry_path(), &ctx.root)
    );
    println!("  Backups:  {}", backups.len());
    if let Some(latest) = backups.last() {
        println!("  Latest:   {}", display_path(latest, &ctx.root));
    }

    Ok(())
}
