//! CLI command implementations.
//!
//! Each command maps to one scanner, storage or analytics call and prints
//! the result. Commands that read the registry fail with a non-zero exit
//! when it is missing or invalid.

pub mod customers;
pub mod duplicates;
pub mod errors;
pub mod export;
pub mod init;
pub mod institutions;
pub mod scan;
pub mod search;
pub mod stats;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::registry::Registry;
use crate::storage::{RegistryStore, StorageError};
use crate::Config;

/// Project root, configuration and resolved storage paths shared by every
/// command.
pub struct CommandContext {
    pub root: PathBuf,
    pub config: Config,
    pub store: RegistryStore,
}

impl CommandContext {
    /// Resolve storage paths from `config`, with `data_dir` taking
    /// precedence over `storage.data_dir`.
    pub fn new(root: PathBuf, mut config: Config, data_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = data_dir {
            config.storage.data_dir = dir;
        }
        let store = RegistryStore::from_config(&config.storage, &root);
        Self {
            root,
            config,
            store,
        }
    }

    /// Load and validate the saved registry.
    pub fn load_registry(&self) -> Result<Registry> {
        match self.store.load() {
            Ok(registry) => Ok(registry),
            Err(StorageError::NotFound(path)) => anyhow::bail!(
                "No registry at {}. Run 'certindex scan <PATH>' first.",
                path.display()
            ),
            Err(e) => Err(e).context("Failed to load registry"),
        }
    }
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

pub(crate) fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

pub(crate) fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
