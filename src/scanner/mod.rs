//! Local folder scanner.
//!
//! Each immediate subdirectory of the base path is one customer; every
//! file with a supported extension below it is one certificate. Entries
//! that cannot be read are skipped and reported; only an invalid base path
//! aborts the scan.

mod report;
mod walker;

pub use report::{ScanIssue, ScanReport, ScanStage, ScanSummary};
pub use walker::Walker;

use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::classify::{
    guess_mime_type, has_error_prefix, parse_filename_date, CustomerTypeClassifier,
    InstitutionMatcher,
};
use crate::config::ScannerConfig;
use crate::metrics;
use crate::registry::{
    ids, CertificateRecord, CertificateStatus, Customer, CustomerType, DateSource, Registry,
    RegistryMetadata, ValidationError,
};

/// Errors that abort a scan entirely.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Base path does not exist: {0}")]
    BasePathMissing(PathBuf),

    #[error("Base path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to read base directory {path}: {source}")]
    BaseUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan produced an invalid registry: {0}")]
    Validation(#[from] ValidationError),
}

/// A freshly scanned registry together with its report.
#[derive(Debug)]
pub struct ScanOutput {
    pub registry: Registry,
    pub report: ScanReport,
}

/// Builds a [`Registry`] from a directory of customer folders.
pub struct Scanner {
    config: ScannerConfig,
    type_classifier: CustomerTypeClassifier,
    institutions: InstitutionMatcher,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScannerConfig::default())
    }
}

impl Scanner {
    pub fn new(config: ScannerConfig) -> Self {
        let type_classifier =
            CustomerTypeClassifier::with_token_threshold(config.company_token_threshold);
        Self {
            config,
            type_classifier,
            institutions: InstitutionMatcher::default(),
        }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scan `base` without progress output.
    pub fn scan(&self, base: &Path) -> Result<ScanOutput, ScanError> {
        self.scan_with_progress(base, &ProgressBar::hidden())
    }

    /// Scan `base`, ticking `progress` once per customer folder.
    pub fn scan_with_progress(
        &self,
        base: &Path,
        progress: &ProgressBar,
    ) -> Result<ScanOutput, ScanError> {
        let start = Instant::now();

        if !base.exists() {
            return Err(ScanError::BasePathMissing(base.to_path_buf()));
        }
        if !base.is_dir() {
            return Err(ScanError::NotADirectory(base.to_path_buf()));
        }

        // Customer ids hash folder paths, so every spelling of `base` must
        // resolve to the same folders.
        let canonical = std::fs::canonicalize(base).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ScanError::BasePathMissing(base.to_path_buf())
            } else {
                ScanError::BaseUnreadable {
                    path: base.to_path_buf(),
                    source,
                }
            }
        })?;
        let base = canonical.as_path();

        info!("Scanning customer folders under {}", base.display());

        let mut issues = Vec::new();
        let folders = self.customer_folders(base, &mut issues)?;
        progress.set_length(folders.len() as u64);

        let scanned_at = Utc::now();
        let mut builder = Registry::builder(RegistryMetadata {
            generated_at: scanned_at,
            source: format!("local:{}", base.display()),
        });

        for folder in folders {
            let customer = match self.build_customer(&folder, scanned_at) {
                Ok(customer) => customer,
                Err(issue) => {
                    warn!("Skipping customer folder: {}", issue);
                    issues.push(issue);
                    progress.inc(1);
                    continue;
                }
            };
            progress.set_message(customer.name.clone());

            let walker = Walker::new(folder.clone(), &self.config);
            for outcome in walker.walk() {
                match outcome.and_then(|path| self.index_file(&customer, &path, scanned_at)) {
                    Ok(cert) => {
                        debug!("Indexed {} ({})", cert.filename, cert.certificate_id);
                        builder.add_certificate(cert);
                    }
                    Err(issue) => {
                        warn!("Skipping entry: {}", issue);
                        issues.push(issue);
                    }
                }
            }

            builder.add_customer(customer);
            progress.inc(1);
        }

        let registry = builder.build()?;
        let duration = start.elapsed();
        let summary = ScanSummary::from_registry(&registry);

        metrics::SCANS_TOTAL.inc();
        metrics::SCAN_LATENCY.observe(duration.as_secs_f64());
        metrics::SCAN_ISSUES.inc_by(issues.len() as f64);
        metrics::CUSTOMERS_INDEXED.set(summary.total_customers as f64);
        metrics::CERTIFICATES_INDEXED.set(summary.total_certificates as f64);

        info!(
            "Scan finished in {:.2}s: {} customers, {} certificates, {} skipped entries",
            duration.as_secs_f64(),
            summary.total_customers,
            summary.total_certificates,
            issues.len()
        );

        Ok(ScanOutput {
            registry,
            report: ScanReport {
                summary,
                issues,
                duration,
            },
        })
    }

    /// Classify a folder name as person or company.
    pub fn classify_customer(&self, name: &str) -> CustomerType {
        self.type_classifier.classify(name)
    }

    /// Immediate subdirectories of `base`, sorted by name.
    fn customer_folders(
        &self,
        base: &Path,
        issues: &mut Vec<ScanIssue>,
    ) -> Result<Vec<PathBuf>, ScanError> {
        let mut folders = Vec::new();

        let entries = WalkDir::new(base)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.config.follow_links)
            .sort_by_file_name();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(ScanError::BaseUnreadable {
                        path: base.to_path_buf(),
                        source: err.into(),
                    });
                }
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| base.to_path_buf());
                    let issue = ScanIssue::new(path, ScanStage::Walk, &err);
                    warn!("Skipping entry: {}", issue);
                    issues.push(issue);
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                debug!("Ignoring non-folder {}", entry.path().display());
                continue;
            }

            let hidden = entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with('.'))
                .unwrap_or(false);
            if hidden && self.config.skip_hidden {
                debug!("Skipping hidden folder {}", entry.path().display());
                continue;
            }

            folders.push(entry.into_path());
        }

        Ok(folders)
    }

    fn build_customer(
        &self,
        folder: &Path,
        scanned_at: DateTime<Utc>,
    ) -> Result<Customer, ScanIssue> {
        let raw_name = folder
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| ScanIssue::new(folder, ScanStage::Path, "folder name is not valid UTF-8"))?;

        let name = raw_name.trim();
        if name.is_empty() {
            return Err(ScanIssue::new(folder, ScanStage::Path, "folder name is blank"));
        }

        Ok(Customer {
            customer_id: ids::customer_id(name, folder),
            name: name.to_string(),
            customer_type: self.classify_customer(name),
            folder_path: folder.to_path_buf(),
            origin_folder_id: None,
            created_at: scanned_at,
        })
    }

    fn index_file(
        &self,
        customer: &Customer,
        path: &Path,
        scanned_at: DateTime<Utc>,
    ) -> Result<CertificateRecord, ScanIssue> {
        let filename = path
            .file_name()
            .and_then(OsStr::to_str)
            .ok_or_else(|| ScanIssue::new(path, ScanStage::Path, "file name is not valid UTF-8"))?
            .to_string();
        if path.to_str().is_none() {
            return Err(ScanIssue::new(path, ScanStage::Path, "path is not valid UTF-8"));
        }

        let metadata =
            std::fs::metadata(path).map_err(|e| ScanIssue::new(path, ScanStage::Metadata, e))?;

        let relative = path
            .strip_prefix(&customer.folder_path)
            .unwrap_or_else(|_| Path::new(&filename));

        let has_error = has_error_prefix(&filename);
        let status = if has_error {
            CertificateStatus::Error
        } else {
            CertificateStatus::Ok
        };

        let (date, date_source) = match parse_filename_date(&filename) {
            Some(date) => (Some(date), Some(DateSource::Filename)),
            None => match metadata.modified() {
                Ok(modified) => (
                    Some(DateTime::<Utc>::from(modified).date_naive()),
                    Some(DateSource::FileModified),
                ),
                Err(e) => {
                    debug!("No modification time for {}: {}", path.display(), e);
                    (None, None)
                }
            },
        };

        Ok(CertificateRecord {
            certificate_id: ids::certificate_id(&customer.customer_id, relative),
            customer_id: customer.customer_id.clone(),
            certificate_type: None,
            institution: self.institutions.detect(&filename),
            date,
            date_source,
            status,
            source_files: vec![path.to_path_buf()],
            filename,
            file_path: path.to_path_buf(),
            has_error_prefix: has_error,
            origin_file_id: None,
            mime_type: guess_mime_type(path),
            file_size: Some(metadata.len()),
            indexed_at: scanned_at,
        })
    }
}
