use anyhow::Result;

use super::CommandContext;
use crate::analytics::Analytics;

/// List advisory duplicate clusters. Nothing is removed.
pub fn run(ctx: &CommandContext) -> Result<()> {
    let registry = ctx.load_registry()?;
    let clusters = Analytics::new(&registry).find_suspected_duplicates();

    if clusters.is_empty() {
        println!("No suspected duplicates.");
        return Ok(());
    }

    println!("{} suspected duplicate group(s):\n", clusters.len());
    for cluster in &clusters {
        let owner = registry
            .customer(&cluster.key.customer_id)
            .map(|c| c.name.as_str())
            .unwrap_or("?");
        let date = cluster
            .key
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "undated".to_string());
        let institution = cluster.key.institution.map(|i| i.as_str()).unwrap_or("-");
        println!("{} [{} / {}]", owner, institution, date);
        for cert in &cluster.certificates {
            println!("  - {}", cert.file_path.display());
        }
    }
    println!("\nReview these manually; the registry is unchanged.");
    Ok(())
}
