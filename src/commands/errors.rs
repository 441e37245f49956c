use anyhow::Result;

use super::{percent, truncate, CommandContext};
use crate::analytics::Analytics;

/// Print the error report, skipping customers without errors.
pub fn run(ctx: &CommandContext) -> Result<()> {
    let registry = ctx.load_registry()?;
    let report = Analytics::new(&registry).error_report();

    println!("Error Report");
    println!("============\n");
    println!(
        "{} of {} certificates flagged ERROR ({})",
        report.total_errors,
        report.total_certificates,
        percent(report.error_rate)
    );
    println!("Customers with errors: {}\n", report.customers_with_errors);

    if report.customers_with_errors == 0 {
        return Ok(());
    }

    println!("{:<40} {:>8} {:>8} {:>8}", "CUSTOMER", "ERRORS", "TOTAL", "RATE");
    println!("{}", "-".repeat(67));
    for entry in report.customers.iter().filter(|c| c.error_count > 0) {
        println!(
            "{:<40} {:>8} {:>8} {:>8}",
            truncate(&entry.name, 38),
            entry.error_count,
            entry.total_certificates,
            percent(entry.error_rate)
        );
    }
    Ok(())
}
