use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "certindex")]
#[command(author, version, about = "Index and analyse notary customer certificate folders")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory holding the registry, report and backups
    /// (overrides `storage.data_dir`)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize certindex in the current directory
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Scan a folder of customer folders and save the registry
    Scan {
        /// Base directory; each subdirectory is one customer
        path: PathBuf,

        /// Overwrite the registry without backing up the previous one
        #[arg(long)]
        no_backup: bool,

        /// Skip writing the customer report
        #[arg(long)]
        no_report: bool,
    },

    /// Show registry statistics and metrics
    Stats {
        /// Output in Prometheus format
        #[arg(long)]
        prometheus: bool,
    },

    /// Inspect customers
    Customers {
        #[command(subcommand)]
        command: CustomersCommand,
    },

    /// Search certificate filenames across all customers
    Search {
        /// Case-insensitive filename fragment
        term: String,

        /// Maximum number of results to print
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show error counts per customer
    Errors,

    /// Show certificate counts and error rates per institution
    Institutions,

    /// List suspected duplicate certificates
    Duplicates,

    /// Write the customer report
    Export {
        /// Report destination (defaults to `storage.report_file`)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Subcommands for customer inspection.
#[derive(Subcommand)]
pub enum CustomersCommand {
    /// List all customers
    List,

    /// Show one customer's summary and certificate history
    Show {
        /// Customer name or part of it
        name: String,
    },
}
