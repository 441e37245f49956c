use anyhow::{Context, Result};
use std::path::Path;

use super::{display_path, CommandContext};

/// Write the customer report to `output`, or to the configured report path.
pub fn run(ctx: &CommandContext, output: Option<&Path>) -> Result<()> {
    let registry = ctx.load_registry()?;

    let path = match output {
        Some(path) => {
            ctx.store
                .export_report_to(&registry, path)
                .with_context(|| format!("Failed to export report to {}", path.display()))?;
            path.to_path_buf()
        }
        None => ctx
            .store
            .export_report(&registry)
            .context("Failed to export report")?,
    };

    println!(
        "✓ Report for {} customers written to {}",
        registry.customer_count(),
        display_path(&path, &ctx.root)
    );
    Ok(())
}
