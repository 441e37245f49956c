//! On-disk registry document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::registry::{CertificateRecord, Customer, Registry, RegistryMetadata, ValidationError};

/// Current document layout version.
pub const FORMAT_VERSION: u32 = 1;

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// Canonical JSON form of a [`Registry`].
///
/// Totals are informational; they are recomputed on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    pub generated_at: DateTime<Utc>,
    pub source: String,
    #[serde(default)]
    pub total_customers: usize,
    #[serde(default)]
    pub total_certificates: usize,
    pub customers: Vec<Customer>,
    pub certificates: Vec<CertificateRecord>,
}

impl RegistryDocument {
    pub fn from_registry(registry: &Registry) -> Self {
        let metadata = registry.metadata();
        Self {
            format_version: FORMAT_VERSION,
            generated_at: metadata.generated_at,
            source: metadata.source.clone(),
            total_customers: registry.customer_count(),
            total_certificates: registry.certificate_count(),
            customers: registry.customers().to_vec(),
            certificates: registry.certificates().to_vec(),
        }
    }

    /// Re-validate every invariant and rebuild the registry.
    pub fn into_registry(self) -> Result<Registry, ValidationError> {
        if self.total_customers != self.customers.len()
            || self.total_certificates != self.certificates.len()
        {
            warn!(
                "Registry totals ({} customers, {} certificates) disagree with contents ({}, {}); using contents",
                self.total_customers,
                self.total_certificates,
                self.customers.len(),
                self.certificates.len()
            );
        }

        Registry::new(
            RegistryMetadata {
                generated_at: self.generated_at,
                source: self.source,
            },
            self.customers,
            self.certificates,
        )
    }
}
