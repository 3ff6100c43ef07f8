use crate::search::config::{BackendConfig, SearchConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Index lookup and paging limits
    #[serde(default)]
    pub search: SearchConfig,

    /// Index backend call policy
    #[serde(default)]
    pub backend: BackendConfig,

    /// Offline index rebuild configuration
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/default.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: PRODUCT_SEARCH__)
            .add_source(
                config::Environment::with_prefix("PRODUCT_SEARCH")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Whole-request timeout applied by the HTTP layer (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// JSON feed (array of product objects) to load
    #[serde(default = "default_feed_path")]
    pub feed_path: PathBuf,

    /// Physical index rebuilt by each run
    #[serde(default = "default_physical_index")]
    pub index_name: String,

    /// Stable alias published once the rebuild completes
    #[serde(default = "default_alias")]
    pub alias: String,

    /// Index writer heap size in bytes
    #[serde(default = "default_writer_heap_size")]
    pub writer_heap_size: usize,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            feed_path: default_feed_path(),
            index_name: default_physical_index(),
            alias: default_alias(),
            writer_heap_size: default_writer_heap_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,

    /// Service name
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
            service_name: default_service_name(),
            prometheus_enabled: true,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_feed_path() -> PathBuf {
    PathBuf::from("data/products.json")
}

fn default_physical_index() -> String {
    "product_index".to_string()
}

fn default_alias() -> String {
    "product_index_alias".to_string()
}

fn default_writer_heap_size() -> usize {
    50_000_000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "product-search".to_string()
}

fn default_true() -> bool {
    true
}
