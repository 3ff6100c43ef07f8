//! Prometheus metrics for the search and ingestion paths.
//!
//! Metrics are created lazily and can be recorded before [`init_metrics`]
//! registers them; only registered metrics appear in [`gather_metrics`].
//!
//! # Example
//! ```no_run
//! use product_search::metrics::SEARCH_REQUESTS_TOTAL;
//!
//! SEARCH_REQUESTS_TOTAL.with_label_values(&["success"]).inc();
//! ```

use lazy_static::lazy_static;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

const NAMESPACE: &str = "product_search";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Searches served
    ///
    /// Labels: outcome (success, invalid, unavailable, backend_error, timeout)
    pub static ref SEARCH_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("requests_total", "Total number of search requests")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create SEARCH_REQUESTS_TOTAL metric");

    /// End-to-end search latency in seconds
    pub static ref SEARCH_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new("duration_seconds", "Search latency in seconds")
            .namespace(NAMESPACE)
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
    ).expect("Failed to create SEARCH_DURATION_SECONDS metric");

    /// Retries issued after transient backend faults
    pub static ref BACKEND_RETRIES_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("backend_retries_total", "Total number of index backend retries")
            .namespace(NAMESPACE)
    ).expect("Failed to create BACKEND_RETRIES_TOTAL metric");

    /// Documents written by index rebuilds
    pub static ref DOCUMENTS_INDEXED_TOTAL: IntCounter = IntCounter::with_opts(
        Opts::new("documents_indexed_total", "Total number of documents indexed")
            .namespace(NAMESPACE)
    ).expect("Failed to create DOCUMENTS_INDEXED_TOTAL metric");
}

/// Register all metrics with the global registry. Fails if called twice.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(SEARCH_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(BACKEND_RETRIES_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(DOCUMENTS_INDEXED_TOTAL.clone()))?;
    Ok(())
}

/// Encode registered metrics in the Prometheus text format
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
