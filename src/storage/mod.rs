//! Registry persistence.
//!
//! The registry is stored as one canonical JSON document. Saving with a
//! backup first copies the existing document, byte for byte, into the
//! backup directory and only then replaces it via a temp file + rename.
//! Loading re-validates every invariant and fails without returning a
//! partial registry.
//!
//! There is no cross-process locking: callers must serialize writes to a
//! given registry path.

mod document;
mod report;
mod stats;

pub use document::{RegistryDocument, FORMAT_VERSION};
pub use report::{CertificateReportEntry, CustomerReport, CustomerReportEntry, ReportSummary};
pub use stats::{CustomerCount, RegistryStatistics};

use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::StorageConfig;
use crate::metrics;
use crate::registry::{Registry, ValidationError};

const BACKUP_PREFIX: &str = "registry_backup_";

/// Errors raised while saving, loading or exporting a registry.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("No registry found at {0}")]
    NotFound(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed registry document {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Registry document {path} failed integrity checks: {source}")]
    Integrity {
        path: PathBuf,
        #[source]
        source: ValidationError,
    },

    #[error("Registry document {path} has format version {found}, expected at most {supported}")]
    UnsupportedVersion {
        path: PathBuf,
        found: u32,
        supported: u32,
    },

    #[error("Report path {0} must differ from the registry path")]
    ReportTargetsRegistry(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Result of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub registry_path: PathBuf,
    /// Where the previous document was copied, if one existed
    pub backup_path: Option<PathBuf>,
}

/// File locations for one persisted registry.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    registry_path: PathBuf,
    report_path: PathBuf,
    backup_dir: PathBuf,
}

impl RegistryStore {
    pub fn new(
        registry_path: impl Into<PathBuf>,
        report_path: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry_path: registry_path.into(),
            report_path: report_path.into(),
            backup_dir: backup_dir.into(),
        }
    }

    /// Default file layout inside `data_dir`.
    pub fn in_dir(data_dir: &Path) -> Self {
        let defaults = StorageConfig::default();
        Self::new(
            data_dir.join(&defaults.registry_file),
            data_dir.join(&defaults.report_file),
            data_dir.join(&defaults.backup_dir),
        )
    }

    pub fn from_config(config: &StorageConfig, root: &Path) -> Self {
        Self::new(
            config.registry_path(root),
            config.report_path(root),
            config.backup_dir(root),
        )
    }

    pub fn registry_path(&self) -> &Path {
        &self.registry_path
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Check if a registry document exists.
    pub fn exists(&self) -> bool {
        self.registry_path.is_file()
    }

    /// Serialize `registry` to the registry path.
    ///
    /// With `with_backup`, an existing document is copied unmodified to
    /// `backups/registry_backup_<UTC timestamp>.json` before it is
    /// replaced. A failed backup aborts the save and leaves the old
    /// document untouched.
    pub fn save(&self, registry: &Registry, with_backup: bool) -> Result<SaveOutcome, StorageError> {
        let backup_path = if with_backup && self.exists() {
            Some(self.backup()?)
        } else {
            None
        };

        let document = RegistryDocument::from_registry(registry);
        write_json_atomic(&self.registry_path, &document)?;
        metrics::REGISTRY_SAVES.inc();

        info!(
            "Saved registry ({} customers, {} certificates) to {}",
            registry.customer_count(),
            registry.certificate_count(),
            self.registry_path.display()
        );

        Ok(SaveOutcome {
            registry_path: self.registry_path.clone(),
            backup_path,
        })
    }

    /// Deserialize and re-validate the registry document.
    pub fn load(&self) -> Result<Registry, StorageError> {
        let path = &self.registry_path;
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StorageError::NotFound(path.clone())
            } else {
                StorageError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let document: RegistryDocument =
            serde_json::from_str(&content).map_err(|source| StorageError::Serialization {
                path: path.clone(),
                source,
            })?;

        if document.format_version > FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                path: path.clone(),
                found: document.format_version,
                supported: FORMAT_VERSION,
            });
        }

        let registry = document
            .into_registry()
            .map_err(|source| StorageError::Integrity {
                path: path.clone(),
                source,
            })?;
        metrics::REGISTRY_LOADS.inc();

        debug!(
            "Loaded registry with {} customers from {}",
            registry.customer_count(),
            path.display()
        );
        Ok(registry)
    }

    /// Write the human-oriented report to the configured report path.
    pub fn export_report(&self, registry: &Registry) -> Result<PathBuf, StorageError> {
        let path = self.report_path.clone();
        self.export_report_to(registry, &path)?;
        Ok(path)
    }

    /// Write the human-oriented report to `path`.
    ///
    /// Refuses to target the registry document itself.
    pub fn export_report_to(&self, registry: &Registry, path: &Path) -> Result<(), StorageError> {
        if same_file(path, &self.registry_path) {
            return Err(StorageError::ReportTargetsRegistry(path.to_path_buf()));
        }

        let report = CustomerReport::build(registry, Utc::now());
        write_json_atomic(path, &report)?;
        info!("Exported report to {}", path.display());
        Ok(())
    }

    /// Aggregate counts over `registry`.
    pub fn statistics(&self, registry: &Registry) -> RegistryStatistics {
        RegistryStatistics::compute(registry)
    }

    /// Existing backups, oldest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, StorageError> {
        if !self.backup_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in WalkDir::new(&self.backup_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| StorageError::Io {
                path: self.backup_dir.clone(),
                source: e.into(),
            })?;
            let is_backup = entry
                .file_name()
                .to_str()
                .map(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(".json"))
                .unwrap_or(false);
            if entry.file_type().is_file() && is_backup {
                backups.push(entry.into_path());
            }
        }

        // Timestamped names sort chronologically.
        backups.sort();
        Ok(backups)
    }

    fn backup(&self) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(&self.backup_dir).map_err(io_error(&self.backup_dir))?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S_%6f").to_string();
        let mut backup_path = self
            .backup_dir
            .join(format!("{}{}.json", BACKUP_PREFIX, stamp));
        let mut attempt = 1;
        while backup_path.exists() {
            backup_path = self
                .backup_dir
                .join(format!("{}{}_{}.json", BACKUP_PREFIX, stamp, attempt));
            attempt += 1;
        }

        fs::copy(&self.registry_path, &backup_path).map_err(io_error(&backup_path))?;
        metrics::BACKUPS_CREATED.inc();
        info!("Backed up previous registry to {}", backup_path.display());
        Ok(backup_path)
    }
}

/// Write pretty JSON through a temp file and rename it into place.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let content = serde_json::to_string_pretty(value).map_err(|source| {
        StorageError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let mut temp_name = path.file_name().unwrap_or_default().to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = fs::File::create(&temp_path).map_err(io_error(&temp_path))?;
    file.write_all(content.as_bytes())
        .map_err(io_error(&temp_path))?;
    file.sync_all().map_err(io_error(&temp_path))?;

    fs::rename(&temp_path, path).map_err(io_error(path))?;
    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
