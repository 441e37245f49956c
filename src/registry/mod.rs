//! Normalized in-memory registry of customers and their certificates.
//!
//! A [`Registry`] is an immutable snapshot produced wholesale by one scan or
//! one ingestion run. Every constructor re-checks the invariants:
//!
//! - customer and certificate ids are unique
//! - every certificate references a customer present in the registry
//! - `source_files` is never empty
//! - `status == ERROR` exactly when `has_error_prefix` is set
//!
//! The institution vocabulary is closed by construction, since
//! [`Institution`](crate::classify::Institution) is an enum.

pub mod ids;
mod model;

pub use model::{
    CertificateRecord, CertificateStatus, Customer, CustomerType, DateSource, RegistryMetadata,
};

use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Invariant violations detected while building or merging a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Duplicate customer id '{0}'")]
    DuplicateCustomer(String),

    #[error("Duplicate certificate id '{0}'")]
    DuplicateCertificate(String),

    #[error("Certificate '{certificate_id}' references unknown customer '{customer_id}'")]
    UnknownCustomer {
        certificate_id: String,
        customer_id: String,
    },

    #[error("Certificate '{0}' has no source files")]
    EmptySourceFiles(String),

    #[error(
        "Certificate '{certificate_id}' has status {status} but has_error_prefix is {has_error_prefix}"
    )]
    StatusMismatch {
        certificate_id: String,
        status: CertificateStatus,
        has_error_prefix: bool,
    },
}

/// Validated snapshot of customers and certificates.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    metadata: RegistryMetadata,
    customers: Vec<Customer>,
    certificates: Vec<CertificateRecord>,
    customer_index: HashMap<String, usize>,
    certificate_index: HashMap<String, usize>,
    by_customer: HashMap<String, Vec<usize>>,
}

impl Registry {
    /// Build a registry, failing on the first invariant violation.
    ///
    /// No partial registry is ever returned.
    pub fn new(
        metadata: RegistryMetadata,
        customers: Vec<Customer>,
        certificates: Vec<CertificateRecord>,
    ) -> Result<Self, ValidationError> {
        let mut customer_index = HashMap::with_capacity(customers.len());
        for (idx, customer) in customers.iter().enumerate() {
            if customer_index
                .insert(customer.customer_id.clone(), idx)
                .is_some()
            {
                return Err(ValidationError::DuplicateCustomer(
                    customer.customer_id.clone(),
                ));
            }
        }

        let mut certificate_index = HashMap::with_capacity(certificates.len());
        let mut by_customer: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, cert) in certificates.iter().enumerate() {
            validate_certificate(cert, &customer_index)?;

            if certificate_index
                .insert(cert.certificate_id.clone(), idx)
                .is_some()
            {
                return Err(ValidationError::DuplicateCertificate(
                    cert.certificate_id.clone(),
                ));
            }
            by_customer
                .entry(cert.customer_id.clone())
                .or_default()
                .push(idx);
        }

        debug!(
            customers = customers.len(),
            certificates = certificates.len(),
            "Registry validated"
        );

        Ok(Self {
            metadata,
            customers,
            certificates,
            customer_index,
            certificate_index,
            by_customer,
        })
    }

    /// Start an append-only builder.
    pub fn builder(metadata: RegistryMetadata) -> RegistryBuilder {
        RegistryBuilder::new(metadata)
    }

    /// Combine two registries with disjoint ids into a new one.
    ///
    /// The result keeps `self`'s records first and takes `metadata` as its
    /// scan metadata. Any id collision fails the whole merge.
    pub fn merge(self, other: Registry, metadata: RegistryMetadata) -> Result<Self, ValidationError> {
        let mut customers = self.customers;
        customers.extend(other.customers);
        let mut certificates = self.certificates;
        certificates.extend(other.certificates);
        Self::new(metadata, customers, certificates)
    }

    pub fn metadata(&self) -> &RegistryMetadata {
        &self.metadata
    }

    /// Customers in insertion order.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Certificates in insertion order.
    pub fn certificates(&self) -> &[CertificateRecord] {
        &self.certificates
    }

    pub fn customer(&self, customer_id: &str) -> Option<&Customer> {
        self.customer_index
            .get(customer_id)
            .map(|&idx| &self.customers[idx])
    }

    pub fn certificate(&self, certificate_id: &str) -> Option<&CertificateRecord> {
        self.certificate_index
            .get(certificate_id)
            .map(|&idx| &self.certificates[idx])
    }

    /// Certificates owned by a customer, in insertion order.
    ///
    /// Unknown customer ids yield an empty iterator.
    pub fn certificates_for<'a>(
        &'a self,
        customer_id: &str,
    ) -> impl Iterator<Item = &'a CertificateRecord> + 'a {
        self.by_customer
            .get(customer_id)
            .map(|indices| indices.as_slice())
            .unwrap_or(&[])
            .iter()
            .map(move |&idx| &self.certificates[idx])
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }

    /// Break the registry back into its parts.
    pub fn into_parts(self) -> (RegistryMetadata, Vec<Customer>, Vec<CertificateRecord>) {
        (self.metadata, self.customers, self.certificates)
    }
}

fn validate_certificate(
    cert: &CertificateRecord,
    customer_index: &HashMap<String, usize>,
) -> Result<(), ValidationError> {
    if !customer_index.contains_key(&cert.customer_id) {
        return Err(ValidationError::UnknownCustomer {
            certificate_id: cert.certificate_id.clone(),
            customer_id: cert.customer_id.clone(),
        });
    }

    if cert.source_files.is_empty() {
        return Err(ValidationError::EmptySourceFiles(
            cert.certificate_id.clone(),
        ));
    }

    if cert.has_error_prefix != (cert.status == CertificateStatus::Error) {
        return Err(ValidationError::StatusMismatch {
            certificate_id: cert.certificate_id.clone(),
            status: cert.status,
            has_error_prefix: cert.has_error_prefix,
        });
    }

    Ok(())
}

/// Append-only collector used by producers before validation.
#[derive(Debug)]
pub struct RegistryBuilder {
    metadata: RegistryMetadata,
    customers: Vec<Customer>,
    certificates: Vec<CertificateRecord>,
}

impl RegistryBuilder {
    pub fn new(metadata: RegistryMetadata) -> Self {
        Self {
            metadata,
            customers: Vec::new(),
            certificates: Vec::new(),
        }
    }

    pub fn add_customer(&mut self, customer: Customer) -> &mut Self {
        self.customers.push(customer);
        self
    }

    pub fn add_certificate(&mut self, certificate: CertificateRecord) -> &mut Self {
        self.certificates.push(certificate);
        self
    }

    pub fn extend_certificates<I>(&mut self, certificates: I) -> &mut Self
    where
        I: IntoIterator<Item = CertificateRecord>,
    {
        self.certificates.extend(certificates);
        self
    }

    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }

    pub fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    /// Validate and freeze the registry.
    pub fn build(self) -> Result<Registry, ValidationError> {
        Registry::new(self.metadata, self.customers, self.certificates)
    }
}
