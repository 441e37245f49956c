//! Customer listing and lookup.

use anyhow::{bail, Result};

use super::{percent, truncate, CommandContext};
use crate::analytics::{Analytics, MatchKind};

/// List all customers sorted by name.
pub fn list(ctx: &CommandContext) -> Result<()> {
    let registry = ctx.load_registry()?;

    if registry.is_empty() {
        println!("No customers in the registry.");
        return Ok(());
    }

    let mut customers: Vec<_> = registry.customers().iter().collect();
    customers.sort_by_key(|c| c.name.to_lowercase());

    println!(
        "{:<40} {:<8} {:>8} {:>8}",
        "NAME", "TYPE", "CERTS", "ERRORS"
    );
    println!("{}", "-".repeat(67));

    for customer in customers {
        let (total, errors) = registry
            .certificates_for(&customer.customer_id)
            .fold((0, 0), |(total, errors), cert| {
                (total + 1, errors + usize::from(cert.is_error()))
            });
        println!(
            "{:<40} {:<8} {:>8} {:>8}",
            truncate(&customer.name, 38),
            customer.customer_type,
            total,
            errors
        );
    }

    println!("\nTotal: {} customer(s)", registry.customer_count());
    Ok(())
}

/// Show the best match for `name` and list any other matches.
pub fn show(ctx: &CommandContext, name: &str) -> Result<()> {
    let registry = ctx.load_registry()?;
    let analytics = Analytics::new(&registry);

    let matches = analytics.find_customers_by_name(name);
    let Some(best) = matches.first() else {
        bail!("No customer matches '{}'", name);
    };

    let customer_id = &best.customer.customer_id;
    let Some(summary) = analytics.customer_summary(customer_id) else {
        bail!("Customer '{}' vanished from the registry", customer_id);
    };

    println!("{}", summary.name);
    println!("{}", "=".repeat(summary.name.chars().count().max(8)));
    println!("  ID:     {}", summary.customer_id);
    println!("  Type:   {}", summary.customer_type);
    println!("  Folder: {}", summary.folder_path);
    println!();

    println!(
        "Certificates: {} ({} errors, {} error rate)",
        summary.total_certificates,
        summary.error_certificates,
        percent(summary.error_rate)
    );
    for (institution, count) in &summary.certificates_by_institution {
        println!("  {:<8} {}", institution, count);
    }

    if let Some(timeline) = analytics.timeline_analysis(customer_id) {
        match (timeline.oldest, timeline.newest, timeline.span_days) {
            (Some(oldest), Some(newest), Some(span)) => println!(
                "  Dated {}: {} to {} ({} days)",
                timeline.dated_count, oldest, newest, span
            ),
            _ => println!("  Dated {}: not enough dates for a timeline", timeline.dated_count),
        }
    }
    println!();

    println!("History:");
    for cert in analytics.certificate_history(customer_id) {
        let date = cert
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let institution = cert.institution.map(|i| i.as_str()).unwrap_or("-");
        println!(
            "  {:<10} {:<6} {:<6} {}",
            date, institution, cert.status, cert.filename
        );
    }

    let others: Vec<_> = matches.iter().skip(1).collect();
    if !others.is_empty() {
        println!("\nOther matches:");
        for m in others {
            let kind = match m.kind {
                MatchKind::Exact => "exact",
                MatchKind::Prefix => "prefix",
                MatchKind::Substring => "substring",
            };
            println!("  {} ({})", m.customer.name, kind);
        }
    }

    Ok(())
}
