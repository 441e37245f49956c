//! Denormalized, human-oriented registry report.
//!
//! This is a one-way projection; nothing reads it back.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analytics::Analytics;
use crate::registry::{CertificateRecord, Customer, Registry};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Serialize)]
pub struct CustomerReport {
    pub generated_at: String,
    pub registry_generated_at: String,
    pub source: String,
    pub summary: ReportSummary,
    pub customers: Vec<CustomerReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_customers: usize,
    pub total_certificates: usize,
    pub total_errors: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerReportEntry {
    pub customer_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub customer_type: String,
    pub folder: String,
    pub created_at: String,
    pub total_certificates: usize,
    pub error_certificates: usize,
    pub certificates: Vec<CertificateReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CertificateReportEntry {
    pub certificate_id: String,
    pub filename: String,
    pub institution: Option<String>,
    pub status: String,
    pub date: Option<String>,
    pub has_error: bool,
    pub file_path: String,
    pub indexed_at: String,
}

fn readable(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

impl CustomerReport {
    /// Customers sorted by name, certificates newest first.
    pub fn build(registry: &Registry, generated_at: DateTime<Utc>) -> Self {
        let analytics = Analytics::new(registry);

        let mut customers: Vec<&Customer> = registry.customers().iter().collect();
        customers.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.customer_id.cmp(&b.customer_id))
        });

        let customers: Vec<CustomerReportEntry> = customers
            .into_iter()
            .map(|customer| {
                let history = analytics.certificate_history(&customer.customer_id);
                CustomerReportEntry {
                    customer_id: customer.customer_id.clone(),
                    name: customer.name.clone(),
                    customer_type: customer.customer_type.to_string(),
                    folder: customer.folder_path.display().to_string(),
                    created_at: readable(&customer.created_at),
                    total_certificates: history.len(),
                    error_certificates: history.iter().filter(|c| c.is_error()).count(),
                    certificates: history.into_iter().map(certificate_entry).collect(),
                }
            })
            .collect();

        let summary = ReportSummary {
            total_customers: registry.customer_count(),
            total_certificates: registry.certificate_count(),
            total_errors: registry.certificates().iter().filter(|c| c.is_error()).count(),
        };

        Self {
            generated_at: readable(&generated_at),
            registry_generated_at: readable(&registry.metadata().generated_at),
            source: registry.metadata().source.clone(),
            summary,
            customers,
        }
    }
}

fn certificate_entry(cert: &CertificateRecord) -> CertificateReportEntry {
    CertificateReportEntry {
        certificate_id: cert.certificate_id.clone(),
        filename: cert.filename.clone(),
        institution: cert.institution.map(|i| i.to_string()),
        status: cert.status.to_string(),
        date: cert.date.map(|d| d.format(DATE_FORMAT).to_string()),
        has_error: cert.has_error_prefix,
        file_path: cert.file_path.display().to_string(),
        indexed_at: readable(&cert.indexed_at),
    }
}
