//! Prometheus metrics for certindex
//!
//! Counters and gauges for scans and registry persistence. Analytics
//! queries are read-only and record nothing here.

use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Scan metrics
    // ============================================================================

    /// Total number of completed scans
    pub static ref SCANS_TOTAL: Counter = Counter::with_opts(
        Opts::new(
            "certindex_scans_total",
            "Total number of completed folder scans"
        )
    ).expect("Failed to create SCANS_TOTAL counter");

    /// Scan duration in seconds
    pub static ref SCAN_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "certindex_scan_duration_seconds",
            "Folder scan duration in seconds"
        ).buckets(vec![0.01, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0])
    ).expect("Failed to create SCAN_LATENCY histogram");

    /// Entries skipped during scans
    pub static ref SCAN_ISSUES: Counter = Counter::with_opts(
        Opts::new(
            "certindex_scan_issues_total",
            "Files or folders skipped during scans"
        )
    ).expect("Failed to create SCAN_ISSUES counter");

    /// Customers in the current registry
    pub static ref CUSTOMERS_INDEXED: Gauge = Gauge::with_opts(
        Opts::new(
            "certindex_customers_indexed",
            "Customers in the current registry"
        )
    ).expect("Failed to create CUSTOMERS_INDEXED gauge");

    /// Certificates in the current registry
    pub static ref CERTIFICATES_INDEXED: Gauge = Gauge::with_opts(
        Opts::new(
            "certindex_certificates_indexed",
            "Certificates in the current registry"
        )
    ).expect("Failed to create CERTIFICATES_INDEXED gauge");

    // ============================================================================
    // Persistence metrics
    // ============================================================================

    /// Registry saves
    pub static ref REGISTRY_SAVES: Counter = Counter::with_opts(
        Opts::new(
            "certindex_registry_saves_total",
            "Registry documents written"
        )
    ).expect("Failed to create REGISTRY_SAVES counter");

    /// Registry loads
    pub static ref REGISTRY_LOADS: Counter = Counter::with_opts(
        Opts::new(
            "certindex_registry_loads_total",
            "Registry documents loaded and validated"
        )
    ).expect("Failed to create REGISTRY_LOADS counter");

    /// Backups taken before overwriting a registry
    pub static ref BACKUPS_CREATED: Counter = Counter::with_opts(
        Opts::new(
            "certindex_backups_created_total",
            "Registry backups taken before overwrite"
        )
    ).expect("Failed to create BACKUPS_CREATED counter");
}

/// Register all metrics with the global registry
///
/// Call once at application startup. Panics if registration fails.
pub fn register_metrics() {
    REGISTRY
        .register(Box::new(SCANS_TOTAL.clone()))
        .expect("Failed to register SCANS_TOTAL");
    REGISTRY
        .register(Box::new(SCAN_LATENCY.clone()))
        .expect("Failed to register SCAN_LATENCY");
    REGISTRY
        .register(Box::new(SCAN_ISSUES.clone()))
        .expect("Failed to register SCAN_ISSUES");
    REGISTRY
        .register(Box::new(CUSTOMERS_INDEXED.clone()))
        .expect("Failed to register CUSTOMERS_INDEXED");
    REGISTRY
        .register(Box::new(CERTIFICATES_INDEXED.clone()))
        .expect("Failed to register CERTIFICATES_INDEXED");
    REGISTRY
        .register(Box::new(REGISTRY_SAVES.clone()))
        .expect("Failed to register REGISTRY_SAVES");
    REGISTRY
        .register(Box::new(REGISTRY_LOADS.clone()))
        .expect("Failed to register REGISTRY_LOADS");
    REGISTRY
        .register(Box::new(BACKUPS_CREATED.clone()))
        .expect("Failed to register BACKUPS_CREATED");
}

/// Gather all metrics and encode them in Prometheus text format
///
/// Returns an empty string if encoding fails.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Metrics contained invalid UTF-8: {}", e);
        String::new()
    })
}
