pub mod analytics;
pub mod classify;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod scanner;
pub mod storage;

pub use analytics::Analytics;
pub use config::Config;
pub use registry::{CertificateRecord, Customer, Registry, ValidationError};
pub use scanner::{ScanError, ScanOutput, Scanner};
pub use storage::{RegistryStore, StorageError};
