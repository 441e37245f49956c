use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use certindex::cli::{Cli, Commands, CustomersCommand};
use certindex::commands::{self, CommandContext};
use certindex::config::Config;
use certindex::logging::init_logging;
use certindex::metrics;

fn main() -> Result<()> {
    // Determine project root (current directory)
    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Load configuration (if available, otherwise use defaults)
    let config = Config::load(&project_root)?;

    // The guard MUST be held until program exit to ensure logs are flushed
    let _logging_guard = init_logging(&config.logging, &project_root)?;

    tracing::info!("certindex starting up");
    tracing::debug!("Loaded configuration from: {}", project_root.display());

    metrics::register_metrics();

    let cli = Cli::parse();

    let ctx = CommandContext::new(project_root, config, cli.data_dir);

    match cli.command {
        Commands::Init { force } => {
            commands::init::run(&ctx.root, force)?;
        }
        Commands::Scan {
            path,
            no_backup,
            no_report,
        } => {
            commands::scan::run(&ctx, &path, no_backup, no_report)?;
        }
        Commands::Stats { prometheus } => {
            commands::stats::run(&ctx, prometheus)?;
        }
        Commands::Customers { command } => match command {
            CustomersCommand::List => {
                commands::customers::list(&ctx)?;
            }
            CustomersCommand::Show { name } => {
                commands::customers::show(&ctx, &name)?;
            }
        },
        Commands::Search { term, limit } => {
            commands::search::run(&ctx, &term, limit)?;
        }
        Commands::Errors => {
            commands::errors::run(&ctx)?;
        }
        Commands::Institutions => {
            commands::institutions::run(&ctx)?;
        }
        Commands::Duplicates => {
            commands::duplicates::run(&ctx)?;
        }
        Commands::Export { output } => {
            commands::export::run(&ctx, output.as_deref())?;
        }
    }

    Ok(())
}
