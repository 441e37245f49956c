//! Per-customer and registry-wide aggregates.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{rate, Analytics};
use crate::classify::Institution;
use crate::registry::{CertificateStatus, CustomerType};

const RECENT_CERTIFICATES: usize = 5;
const MONTH_FORMAT: &str = "%Y-%m";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentCertificate {
    pub certificate_id: String,
    pub filename: String,
    pub date: NaiveDate,
    pub institution: Option<Institution>,
    pub status: CertificateStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerSummary {
    pub customer_id: String,
    pub name: String,
    pub customer_type: CustomerType,
    pub folder_path: String,
    pub total_certificates: usize,
    pub error_certificates: usize,
    /// Exactly 0 for a customer with no certificates
    pub error_rate: f64,
    pub certificates_by_institution: BTreeMap<Institution, usize>,
    pub recent_certificates: Vec<RecentCertificate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InstitutionStats {
    pub customer_count: usize,
    pub certificate_count: usize,
    pub error_count: usize,
    pub error_rate: f64,
}

/// Date range of one customer's dated certificates.
///
/// `oldest`, `newest` and `span_days` are `None` unless at least two
/// certificates carry a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub dated_count: usize,
    pub oldest: Option<NaiveDate>,
    pub newest: Option<NaiveDate>,
    pub span_days: Option<i64>,
    /// Certificate counts keyed by `YYYY-MM`
    pub by_month: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerErrorStats {
    pub customer_id: String,
    pub name: String,
    pub total_certificates: usize,
    pub error_count: usize,
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    pub total_certificates: usize,
    pub total_errors: usize,
    pub error_rate: f64,
    pub customers_with_errors: usize,
    /// Every customer, most errors first
    pub customers: Vec<CustomerErrorStats>,
}

impl<'a> Analytics<'a> {
    pub fn customer_summary(&self, customer_id: &str) -> Option<CustomerSummary> {
        let customer = self.customer(customer_id)?;
        let history = self.certificate_history(customer_id);

        let error_certificates = history.iter().filter(|c| c.is_error()).count();
        let mut certificates_by_institution = BTreeMap::new();
        for inst in history.iter().filter_map(|c| c.institution) {
            *certificates_by_institution.entry(inst).or_insert(0) += 1;
        }

        // History is newest first with undated entries last.
        let recent_certificates = history
            .iter()
            .filter_map(|cert| {
                cert.date.map(|date| RecentCertificate {
                    certificate_id: cert.certificate_id.clone(),
                    filename: cert.filename.clone(),
                    date,
                    institution: cert.institution,
                    status: cert.status,
                })
            })
            .take(RECENT_CERTIFICATES)
            .collect();

        Some(CustomerSummary {
            customer_id: customer.customer_id.clone(),
            name: customer.name.clone(),
            customer_type: customer.customer_type,
            folder_path: customer.folder_path.display().to_string(),
            total_certificates: history.len(),
            error_certificates,
            error_rate: rate(error_certificates, history.len()),
            certificates_by_institution,
            recent_certificates,
        })
    }

    /// Certificates grouped by institution. Unclassified certificates are
    /// left out.
    pub fn institution_analysis(&self) -> BTreeMap<Institution, InstitutionStats> {
        let mut stats: BTreeMap<Institution, InstitutionStats> = BTreeMap::new();
        let mut customers: HashMap<Institution, HashSet<&str>> = HashMap::new();

        for cert in self.registry.certificates() {
            let Some(inst) = cert.institution else {
                continue;
            };
            let entry = stats.entry(inst).or_default();
            entry.certificate_count += 1;
            if cert.is_error() {
                entry.error_count += 1;
            }
            customers
                .entry(inst)
                .or_default()
                .insert(cert.customer_id.as_str());
        }

        for (inst, entry) in stats.iter_mut() {
            entry.customer_count = customers.get(inst).map(HashSet::len).unwrap_or(0);
            entry.error_rate = rate(entry.error_count, entry.certificate_count);
        }
        stats
    }

    pub fn timeline_analysis(&self, customer_id: &str) -> Option<Timeline> {
        self.customer(customer_id)?;

        let dates: Vec<NaiveDate> = self
            .registry
            .certificates_for(customer_id)
            .filter_map(|c| c.date)
            .collect();

        let mut by_month = BTreeMap::new();
        for date in &dates {
            *by_month
                .entry(date.format(MONTH_FORMAT).to_string())
                .or_insert(0) += 1;
        }

        let (oldest, newest, span_days) = if dates.len() >= 2 {
            let oldest = dates.iter().min().copied();
            let newest = dates.iter().max().copied();
            let span = match (oldest, newest) {
                (Some(o), Some(n)) => Some((n - o).num_days()),
                _ => None,
            };
            (oldest, newest, span)
        } else {
            (None, None, None)
        };

        Some(Timeline {
            dated_count: dates.len(),
            oldest,
            newest,
            span_days,
            by_month,
        })
    }

    /// Error counts and rates, globally and per customer.
    ///
    /// Customers are ordered by error count, then error rate (both
    /// descending), then name.
    pub fn error_report(&self) -> ErrorReport {
        let mut customers: Vec<CustomerErrorStats> = self
            .registry
            .customers()
            .iter()
            .map(|customer| {
                let (total, errors) = self
                    .registry
                    .certificates_for(&customer.customer_id)
                    .fold((0, 0), |(total, errors), cert| {
                        (total + 1, errors + usize::from(cert.is_error()))
                    });
                CustomerErrorStats {
                    customer_id: customer.customer_id.clone(),
                    name: customer.name.clone(),
                    total_certificates: total,
                    error_count: errors,
                    error_rate: rate(errors, total),
                }
            })
            .collect();

        customers.sort_by(|a, b| {
            b.error_count
                .cmp(&a.error_count)
                .then_with(|| b.error_rate.total_cmp(&a.error_rate))
                .then_with(|| a.name.cmp(&b.name))
        });

        let total_certificates = self.registry.certificate_count();
        let total_errors = self
            .registry
            .certificates()
            .iter()
            .filter(|c| c.is_error())
            .count();

        ErrorReport {
            total_certificates,
            total_errors,
            error_rate: rate(total_errors, total_certificates),
            customers_with_errors: customers.iter().filter(|c| c.error_count > 0).count(),
            customers,
        }
    }
}
