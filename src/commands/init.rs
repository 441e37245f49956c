use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use crate::Config;

pub fn run(root: &Path, force: bool) -> Result<()> {
    if Config::is_initialized(root) && !force {
        bail!(
            "certindex is already initialized in {:?} (use --force to overwrite)",
            Config::certindex_dir(root)
        );
    }

    let config = Config::default();
    config.save(root)?;

    info!("Initialized certindex in {:?}", Config::certindex_dir(root));
    println!(
        "✓ Created {} with default configuration",
        Config::certindex_dir(root).display()
    );
    println!("\nNext steps:");
    println!("  1. Edit .certindex/config.toml to customize settings");
    println!("  2. Run 'certindex scan <PATH>' to index a customer folder tree");
    println!("  3. Run 'certindex stats' to review the registry");

    Ok(())
}
