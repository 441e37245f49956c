//! Scan command: build a fresh registry and replace the saved one.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use super::{display_path, CommandContext};
use crate::scanner::Scanner;

pub fn run(ctx: &CommandContext, path: &Path, no_backup: bool, no_report: bool) -> Result<()> {
    let scanner = Scanner::new(ctx.config.scanner.clone());

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] Scanning: [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let output = scanner.scan_with_progress(path, &pb);
    pb.finish_and_clear();
    let output = output.with_context(|| format!("Scan of {} failed", path.display()))?;

    let with_backup = ctx.config.storage.backup_on_save && !no_backup;
    let saved = ctx
        .store
        .save(&output.registry, with_backup)
        .context("Failed to save registry")?;

    println!("Scan of {}", path.display());
    println!("{}", "=".repeat(40));
    output.report.print_summary();
    println!();

    println!(
        "Registry saved to {}",
        display_path(&saved.registry_path, &ctx.root)
    );
    if let Some(backup) = &saved.backup_path {
        println!("Previous registry backed up to {}", display_path(backup, &ctx.root));
    }

    if !no_report {
        let report = ctx
            .store
            .export_report(&output.registry)
            .context("Failed to export report")?;
        println!("Report written to {}", display_path(&report, &ctx.root));
    }

    Ok(())
}
