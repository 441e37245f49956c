//! Aggregate counts over a whole registry.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::classify::Institution;
use crate::registry::{CertificateStatus, CustomerType, DateSource, Registry};

const TOP_CUSTOMERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerCount {
    pub customer_id: String,
    pub name: String,
    pub certificate_count: usize,
}

/// Counts by customer type, status, institution and date provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStatistics {
    pub total_customers: usize,
    pub total_certificates: usize,
    pub customers_by_type: BTreeMap<CustomerType, usize>,
    pub certificates_by_status: BTreeMap<CertificateStatus, usize>,
    pub certificates_by_institution: BTreeMap<Institution, usize>,
    /// Certificates with no recognised institution
    pub unclassified_certificates: usize,
    pub dates_from_filename: usize,
    pub dates_from_metadata: usize,
    /// Largest customers by certificate count
    pub top_customers: Vec<CustomerCount>,
}

impl RegistryStatistics {
    pub fn compute(registry: &Registry) -> Self {
        let mut stats = Self {
            total_customers: registry.customer_count(),
            total_certificates: registry.certificate_count(),
            ..Default::default()
        };

        for customer in registry.customers() {
            *stats.customers_by_type.entry(customer.customer_type).or_default() += 1;
        }

        let mut per_customer: HashMap<&str, usize> = HashMap::new();
        for cert in registry.certificates() {
            *stats.certificates_by_status.entry(cert.status).or_default() += 1;

            match cert.institution {
                Some(inst) => *stats.certificates_by_institution.entry(inst).or_default() += 1,
                None => stats.unclassified_certificates += 1,
            }

            match (cert.date, cert.date_source) {
                (Some(_), Some(DateSource::FileModified)) => stats.dates_from_metadata += 1,
                (Some(_), _) => stats.dates_from_filename += 1,
                (None, _) => {}
            }

            *per_customer.entry(cert.customer_id.as_str()).or_default() += 1;
        }

        let mut top: Vec<CustomerCount> = registry
            .customers()
            .iter()
            .filter_map(|c| {
                per_customer
                    .get(c.customer_id.as_str())
                    .map(|&count| CustomerCount {
                        customer_id: c.customer_id.clone(),
                        name: c.name.clone(),
                        certificate_count: count,
                    })
            })
            .collect();
        top.sort_by(|a, b| {
            b.certificate_count
                .cmp(&a.certificate_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        top.truncate(TOP_CUSTOMERS);
        stats.top_customers = top;

        stats
    }

    pub fn customers_of_type(&self, customer_type: CustomerType) -> usize {
        self.customers_by_type.get(&customer_type).copied().unwrap_or(0)
    }

    pub fn certificates_with_status(&self, status: CertificateStatus) -> usize {
        self.certificates_by_status.get(&status).copied().unwrap_or(0)
    }
}
