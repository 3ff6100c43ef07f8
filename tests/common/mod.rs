//! Shared fixtures for the integration tests
//!
//! Every test gets its own temporary index root populated from
//! `data/products.json` through the real rebuild path.

#![allow(dead_code)]

use product_search::config::IngestionConfig;
use product_search::ingestion::IndexRebuilder;
use product_search::search::{BackendConfig, IndexCatalog, ProductSearchService, SearchConfig};
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

pub const PHYSICAL_INDEX: &str = "product_index";
pub const ALIAS: &str = "product_index_alias";

/// Path of the product fixture shipped with the crate
pub fn fixture_feed() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/products.json")
}

pub fn ingestion_config() -> IngestionConfig {
    IngestionConfig {
        feed_path: fixture_feed(),
        index_name: PHYSICAL_INDEX.to_string(),
        alias: ALIAS.to_string(),
        writer_heap_size: 15_000_000,
    }
}

pub fn rebuilder(dir: &TempDir) -> IndexRebuilder {
    IndexRebuilder::new(IndexCatalog::new(dir.path()), ingestion_config())
}

pub fn search_config(dir: &TempDir) -> SearchConfig {
    SearchConfig {
        index_root: dir.path().to_path_buf(),
        index_name: ALIAS.to_string(),
        ..Default::default()
    }
}

/// Service over an index root that has not been populated
pub fn empty_service(dir: &TempDir) -> ProductSearchService {
    ProductSearchService::with_tantivy(search_config(dir), BackendConfig::default())
}

/// Index the fixture feed and return a service reading it.
/// Keep the `TempDir` alive for as long as the service is used.
pub fn indexed_service() -> (TempDir, ProductSearchService) {
    let dir = TempDir::new().unwrap();
    rebuilder(&dir).rebuild_index().unwrap();
    let service = empty_service(&dir);
    (dir, service)
}

/// Collect sample lines of the Prometheus text format by metric family
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            if let Some(name) = line.split_whitespace().nth(2) {
                current_metric = name.to_string();
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
