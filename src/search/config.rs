//! Search configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Search service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Directory holding physical indexes and the alias manifest
    #[serde(default = "default_index_root")]
    pub index_root: PathBuf,

    /// Index name or alias queried by the service
    #[serde(default = "default_index_name")]
    pub index_name: String,

    /// Page size applied when a request omits `size`
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest accepted page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Upper bound on `page * size + size`
    #[serde(default = "default_max_result_window")]
    pub max_result_window: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            index_root: default_index_root(),
            index_name: default_index_name(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_result_window: default_max_result_window(),
        }
    }
}

/// Policy for calls into the index backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Deadline for one search, retries included (milliseconds)
    #[serde(default = "default_backend_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Retries after the first attempt, transient faults only
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial retry backoff (milliseconds), doubled per attempt
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Backoff ceiling (milliseconds)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_backend_timeout_ms(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

fn default_index_root() -> PathBuf {
    PathBuf::from("./data/indexes")
}

fn default_index_name() -> String {
    "product_index_alias".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

fn default_max_result_window() -> u64 {
    10_000
}

fn default_backend_timeout_ms() -> u64 {
    5_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    50
}

fn default_max_backoff_ms() -> u64 {
    1_000
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn index_root(mut self, path: PathBuf) -> Self {
        self.config.index_root = path;
        self
    }

    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.config.index_name = name.into();
        self
    }

    pub fn default_page_size(mut self, size: u32) -> Self {
        self.config.default_page_size = size;
        self
    }

    pub fn max_page_size(mut self, size: u32) -> Self {
        self.config.max_page_size = size;
        self
    }

    pub fn max_result_window(mut self, window: u64) -> Self {
        self.config.max_result_window = window;
        self
    }

    pub fn build(self) -> SearchConfig {
        self.config
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
