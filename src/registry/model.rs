//! Customer and certificate records held by a [`Registry`](super::Registry).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::classify::Institution;

/// Whether a customer folder belongs to a natural person or a legal entity.
///
/// Assigned by keyword heuristics; treat it as a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomerType {
    Person,
    Company,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Company => "COMPANY",
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Certificate status as recorded at creation time.
///
/// Local scans only ever produce `Ok` or `Error`. `Unknown` is left for
/// producers that cannot tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CertificateStatus {
    Ok,
    Error,
    Unknown,
}

impl CertificateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Where a certificate's `date` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// Parsed out of the filename
    Filename,
    /// Fell back to the file's last-modified timestamp
    FileModified,
}

/// One customer, i.e. one top-level folder of the holdings tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Stable identifier derived from name and folder path
    pub customer_id: String,
    /// Folder name, trimmed
    pub name: String,
    pub customer_type: CustomerType,
    /// Path of the customer folder
    pub folder_path: PathBuf,
    /// Remote folder id when produced by cloud ingestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_folder_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One certificate file belonging to a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// Stable identifier derived from owning customer id and relative path
    pub certificate_id: String,
    pub customer_id: String,
    /// Filled in by later extraction stages
    #[serde(default)]
    pub certificate_type: Option<String>,
    #[serde(default)]
    pub institution: Option<Institution>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_source: Option<DateSource>,
    pub status: CertificateStatus,
    /// Never empty
    pub source_files: Vec<PathBuf>,
    pub filename: String,
    pub file_path: PathBuf,
    pub has_error_prefix: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_file_id: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    pub indexed_at: DateTime<Utc>,
}

impl CertificateRecord {
    /// True when the record is flagged as an error.
    pub fn is_error(&self) -> bool {
        self.status == CertificateStatus::Error
    }
}

/// Scan-level metadata stored alongside the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryMetadata {
    /// When the producing scan or ingestion run finished
    pub generated_at: DateTime<Utc>,
    /// Free-form description of the producer, e.g. `local:/srv/clientes`
    pub source: String,
}

impl RegistryMetadata {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.into(),
        }
    }
}
