use anyhow::Result;

use super::{percent, CommandContext};
use crate::analytics::Analytics;

pub fn run(ctx: &CommandContext) -> Result<()> {
    let registry = ctx.load_registry()?;
    let analysis = Analytics::new(&registry).institution_analysis();

    if analysis.is_empty() {
        println!("No certificates with a recognised institution.");
        return Ok(());
    }

    println!(
        "{:<11} {:>10} {:>12} {:>8} {:>8}",
        "INSTITUTION", "CUSTOMERS", "CERTIFICATES", "ERRORS", "RATE"
    );
    println!("{}", "-".repeat(53));
    for (institution, stats) in &analysis {
        println!(
            "{:<11} {:>10} {:>12} {:>8} {:>8}",
            institution,
            stats.customer_count,
            stats.certificate_count,
            stats.error_count,
            percent(stats.error_rate)
        );
    }
    Ok(())
}
