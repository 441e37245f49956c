//! Per-entry outcomes and the aggregated scan report.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::classify::FileKind;
use crate::registry::{CertificateStatus, CustomerType, DateSource, Registry};

/// Where in the scan an entry was skipped.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum ScanStage {
    /// Listing a directory or reading an entry failed
    Walk,
    /// Reading file metadata failed
    Metadata,
    /// The path cannot be represented as UTF-8
    Path,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStage::Walk => write!(f, "Walk"),
            ScanStage::Metadata => write!(f, "Metadata"),
            ScanStage::Path => write!(f, "Path"),
        }
    }
}

/// A file or directory the scan had to skip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    pub path: PathBuf,
    pub stage: ScanStage,
    pub message: String,
}

impl ScanIssue {
    pub fn new(path: impl Into<PathBuf>, stage: ScanStage, message: impl fmt::Display) -> Self {
        Self {
            path: path.into(),
            stage,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.path.display(), self.message)
    }
}

/// Counts over a freshly scanned registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total_customers: usize,
    pub customers_by_type: BTreeMap<CustomerType, usize>,
    pub total_certificates: usize,
    pub certificates_by_status: BTreeMap<CertificateStatus, usize>,
    pub dated_from_filename: usize,
    pub dated_from_metadata: usize,
    pub undated: usize,
    /// Certificates stored as images that will need OCR downstream
    pub ocr_candidates: usize,
}

impl ScanSummary {
    pub fn from_registry(registry: &Registry) -> Self {
        let mut summary = Self {
            total_customers: registry.customer_count(),
            total_certificates: registry.certificate_count(),
            ..Default::default()
        };

        for customer in registry.customers() {
            *summary
                .customers_by_type
                .entry(customer.customer_type)
                .or_default() += 1;
        }

        for cert in registry.certificates() {
            *summary.certificates_by_status.entry(cert.status).or_default() += 1;

            match (cert.date, cert.date_source) {
                (None, _) => summary.undated += 1,
                (Some(_), Some(DateSource::FileModified)) => summary.dated_from_metadata += 1,
                (Some(_), _) => summary.dated_from_filename += 1,
            }

            if FileKind::detect(&cert.file_path).requires_ocr() {
                summary.ocr_candidates += 1;
            }
        }

        summary
    }

    pub fn customers_of_type(&self, customer_type: CustomerType) -> usize {
        self.customers_by_type.get(&customer_type).copied().unwrap_or(0)
    }

    pub fn certificates_with_status(&self, status: CertificateStatus) -> usize {
        self.certificates_by_status.get(&status).copied().unwrap_or(0)
    }
}

/// Outcome of one scan: what was indexed and what had to be skipped.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub summary: ScanSummary,
    pub issues: Vec<ScanIssue>,
    pub duration: Duration,
}

impl ScanReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn issues_by_stage(&self) -> BTreeMap<ScanStage, Vec<&ScanIssue>> {
        let mut by_stage: BTreeMap<ScanStage, Vec<&ScanIssue>> = BTreeMap::new();
        for issue in &self.issues {
            by_stage.entry(issue.stage).or_default().push(issue);
        }
        by_stage
    }

    /// Print a summary of the scan to stdout
    pub fn print_summary(&self) {
        let s = &self.summary;
        println!("Total customers:    {}", s.total_customers);
        println!("  - Persons:        {}", s.customers_of_type(CustomerType::Person));
        println!("  - Companies:      {}", s.customers_of_type(CustomerType::Company));
        println!("Total certificates: {}", s.total_certificates);
        println!("  - OK:             {}", s.certificates_with_status(CertificateStatus::Ok));
        println!("  - ERROR:          {}", s.certificates_with_status(CertificateStatus::Error));
        println!(
            "Dates: {} from filename, {} from file metadata, {} undated",
            s.dated_from_filename, s.dated_from_metadata, s.undated
        );
        if s.ocr_candidates > 0 {
            println!("Image certificates needing OCR: {}", s.ocr_candidates);
        }
        println!("Scan took {:.2}s", self.duration.as_secs_f64());

        if !self.has_issues() {
            return;
        }

        println!();
        println!("⚠️  Skipped {} entries", self.issues.len());
        for (stage, issues) in self.issues_by_stage() {
            println!("  {}: {} entries", stage, issues.len());

            for issue in issues.iter().take(5) {
                println!("    - {}: {}", issue.path.display(), issue.message);
            }

            if issues.len() > 5 {
                println!("    ... and {} more", issues.len() - 5);
            }
        }
    }
}
