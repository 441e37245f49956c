//! Read-only queries over a [`Registry`].
//!
//! Nothing in this module mutates the registry or records metrics, so one
//! loaded snapshot can serve any number of callers.

mod duplicates;
mod summary;

pub use duplicates::{normalize_filename, DuplicateCluster, DuplicateKey};
pub use summary::{
    CustomerErrorStats, CustomerSummary, ErrorReport, InstitutionStats, RecentCertificate,
    Timeline,
};

use serde::Serialize;
use std::cmp::Ordering;

use crate::registry::{CertificateRecord, Customer, Registry};

/// How a customer name matched a query. Better matches order first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Exact,
    Prefix,
    Substring,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CustomerMatch<'a> {
    pub customer: &'a Customer,
    pub kind: MatchKind,
}

/// Query facade borrowing one registry snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Analytics<'a> {
    registry: &'a Registry,
}

impl<'a> Analytics<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn customer(&self, customer_id: &str) -> Option<&'a Customer> {
        self.registry.customer(customer_id)
    }

    /// Every customer whose name contains `query`, case-insensitively.
    ///
    /// Exact matches come first, then prefix matches, then other
    /// substring matches; ties are ordered by name. A blank query matches
    /// nothing.
    pub fn find_customers_by_name(&self, query: &str) -> Vec<CustomerMatch<'a>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<CustomerMatch<'a>> = self
            .registry
            .customers()
            .iter()
            .filter_map(|customer| {
                let name = customer.name.to_lowercase();
                let kind = if name == needle {
                    MatchKind::Exact
                } else if name.starts_with(&needle) {
                    MatchKind::Prefix
                } else if name.contains(&needle) {
                    MatchKind::Substring
                } else {
                    return None;
                };
                Some(CustomerMatch { customer, kind })
            })
            .collect();

        matches.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.customer.name.cmp(&b.customer.name))
                .then_with(|| a.customer.customer_id.cmp(&b.customer.customer_id))
        });
        matches
    }

    /// All certificates of a customer, newest first.
    ///
    /// Undated certificates follow every dated one. Ties fall back to
    /// filename and then id so the order is stable.
    pub fn certificate_history(&self, customer_id: &str) -> Vec<&'a CertificateRecord> {
        let mut history: Vec<&'a CertificateRecord> =
            self.registry.certificates_for(customer_id).collect();
        history.sort_by(|a, b| newest_first(a, b));
        history
    }

    /// [`certificate_history`](Self::certificate_history) restricted to
    /// ERROR certificates.
    pub fn error_history(&self, customer_id: &str) -> Vec<&'a CertificateRecord> {
        self.certificate_history(customer_id)
            .into_iter()
            .filter(|cert| cert.is_error())
            .collect()
    }

    /// Certificates of any customer whose institution equals `institution`,
    /// ignoring case.
    pub fn by_institution(&self, institution: &str) -> Vec<&'a CertificateRecord> {
        let wanted = institution.trim();
        self.registry
            .certificates()
            .iter()
            .filter(|cert| {
                cert.institution
                    .map(|inst| inst.as_str().eq_ignore_ascii_case(wanted))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// One customer's certificates for one institution, newest first.
    pub fn customer_certificates_by_institution(
        &self,
        customer_id: &str,
        institution: &str,
    ) -> Vec<&'a CertificateRecord> {
        let wanted = institution.trim();
        self.certificate_history(customer_id)
            .into_iter()
            .filter(|cert| {
                cert.institution
                    .map(|inst| inst.as_str().eq_ignore_ascii_case(wanted))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Certificates across every customer whose filename contains `term`,
    /// case-insensitively, in registry order.
    pub fn search(&self, term: &str) -> Vec<&'a CertificateRecord> {
        let needle = term.to_lowercase();
        self.registry
            .certificates()
            .iter()
            .filter(|cert| cert.filename.to_lowercase().contains(&needle))
            .collect()
    }
}

fn newest_first(a: &CertificateRecord, b: &CertificateRecord) -> Ordering {
    let by_date = match (a.date, b.date) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_date
        .then_with(|| a.filename.cmp(&b.filename))
        .then_with(|| a.certificate_id.cmp(&b.certificate_id))
}

/// `part / total`, or exactly 0 when `total` is 0.
pub(crate) fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
