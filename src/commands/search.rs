use anyhow::Result;

use super::{truncate, CommandContext};
use crate::analytics::Analytics;

/// Print certificates whose filename contains `term`.
pub fn run(ctx: &CommandContext, term: &str, limit: usize) -> Result<()> {
    let registry = ctx.load_registry()?;
    let results = Analytics::new(&registry).search(term);

    if results.is_empty() {
        println!("No certificates match '{}'.", term);
        return Ok(());
    }

    println!("Found {} certificate(s) matching '{}':\n", results.len(), term);
    for cert in results.iter().take(limit) {
        let owner = registry
            .customer(&cert.customer_id)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        let date = cert
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<30} {:<10} {:<6} {}",
            truncate(owner, 28),
            date,
            cert.status,
            cert.filename
        );
    }

    if results.len() > limit {
        println!("\n... and {} more (use --limit to show more)", results.len() - limit);
    }
    Ok(())
}
