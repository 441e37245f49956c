//! Advisory duplicate detection.
//!
//! Clusters are hints for human review. Records are never removed or
//! merged here.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use super::Analytics;
use crate::classify::Institution;
use crate::registry::CertificateRecord;

/// Filename lowercased with all whitespace removed.
pub fn normalize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Grouping key shared by every member of a cluster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DuplicateKey {
    pub customer_id: String,
    pub normalized_filename: String,
    pub institution: Option<Institution>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCluster<'a> {
    pub key: DuplicateKey,
    pub certificates: Vec<&'a CertificateRecord>,
}

impl<'a> Analytics<'a> {
    /// Groups of two or more certificates of the same customer sharing
    /// normalized filename, institution and date.
    pub fn find_suspected_duplicates(&self) -> Vec<DuplicateCluster<'a>> {
        let mut groups: BTreeMap<DuplicateKey, Vec<&'a CertificateRecord>> = BTreeMap::new();
        for cert in self.registry.certificates() {
            let key = DuplicateKey {
                customer_id: cert.customer_id.clone(),
                normalized_filename: normalize_filename(&cert.filename),
                institution: cert.institution,
                date: cert.date,
            };
            groups.entry(key).or_default().push(cert);
        }

        groups
            .into_iter()
            .filter(|(_, certificates)| certificates.len() > 1)
            .map(|(key, certificates)| DuplicateCluster { key, certificates })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{certificate, customer, registry};
    use super::*;

    #[test]
    fn test_normalize_filename() {
        assert_eq!(normalize_filename("Cert BPS .pdf"), "certbps.pdf");
        assert_eq!(normalize_filename("cert\tbps.PDF"), "certbps.pdf");
    }

    #[test]
    fn test_duplicates_within_customer() {
        let reg = registry(
            vec![customer("a", "Ana"), customer("b", "Luis")],
            vec![
                certificate("1", "a", "Cert BPS.pdf", Some(Institution::Bps), Some((2024, 1, 1))),
                certificate("2", "a", "cert bps.pdf", Some(Institution::Bps), Some((2024, 1, 1))),
                // Same name, different date
                certificate("3", "a", "certbps.pdf", Some(Institution::Bps), Some((2024, 2, 1))),
                // Same name in another customer
                certificate("4", "b", "Cert BPS.pdf", Some(Institution::Bps), Some((2024, 1, 1))),
            ],
        );
        let clusters = Analytics::new(&reg).find_suspected_duplicates();

        assert_eq!(clusters.len(), 1);
        let ids: Vec<&str> = clusters[0]
            .certificates
            .iter()
            .map(|c| c.certificate_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(clusters[0].key.customer_id, "a");
    }

    #[test]
    fn test_no_duplicates() {
        let reg = registry(
            vec![customer("a", "Ana")],
            vec![
                certificate("1", "a", "one.pdf", None, None),
                certificate("2", "a", "two.pdf", None, None),
            ],
        );
        assert!(Analytics::new(&reg).find_suspected_duplicates().is_empty());
    }
}
