//! Product search service

use crate::metrics::{SEARCH_DURATION_SECONDS, SEARCH_REQUESTS_TOTAL};
use crate::models::{SearchRequest, SearchResponse};
use crate::search::assembler::assemble;
use crate::search::backend::{BackendRequest, IndexBackend, SortOrder};
use crate::search::config::{BackendConfig, SearchConfig};
use crate::search::error::{SearchError, SearchResult};
use crate::search::executor::SearchExecutor;
use crate::search::facets::{plan_facets, FacetDeclaration};
use crate::search::normalize::normalize;
use crate::search::query::build_query;
use crate::search::tantivy_backend::TantivyBackend;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Serving-side context: one per process, shared by all requests.
pub struct ProductSearchService {
    executor: SearchExecutor,
    config: SearchConfig,
    facet_plan: Vec<FacetDeclaration>,
}

impl ProductSearchService {
    pub fn new(
        backend: Arc<dyn IndexBackend>,
        config: SearchConfig,
        backend_config: BackendConfig,
    ) -> Self {
        Self {
            executor: SearchExecutor::new(backend, backend_config),
            config,
            facet_plan: plan_facets(),
        }
    }

    /// Service over the embedded index rooted at `config.index_root`
    pub fn with_tantivy(config: SearchConfig, backend_config: BackendConfig) -> Self {
        let backend = Arc::new(TantivyBackend::new(config.index_root.clone()));
        Self::new(backend, config, backend_config)
    }

    /// Name or alias this service searches
    pub fn index_name(&self) -> &str {
        &self.config.index_name
    }

    pub async fn search(&self, request: SearchRequest) -> SearchResult<SearchResponse> {
        let start_time = Instant::now();
        let result = self.run(request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(SearchError::Validation(_)) => "invalid",
            Err(SearchError::BackendUnavailable(_)) => "unavailable",
            Err(SearchError::Timeout(_)) => "timeout",
            Err(_) => "backend_error",
        };
        SEARCH_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
        SEARCH_DURATION_SECONDS.observe(start_time.elapsed().as_secs_f64());

        if let Ok(response) = &result {
            info!(
                index = %self.config.index_name,
                total_hits = response.total_hits,
                returned = response.products.len(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Search completed"
            );
        }

        result
    }

    async fn run(&self, request: SearchRequest) -> SearchResult<SearchResponse> {
        let normalized = normalize(request, &self.config)?;

        let backend_request = BackendRequest {
            index: self.config.index_name.clone(),
            query: build_query(&normalized),
            facets: self.facet_plan.clone(),
            offset: normalized.offset(),
            limit: normalized.size,
            sort: SortOrder::RelevanceDescending,
        };

        let result = self.executor.execute(&backend_request).await?;
        Ok(assemble(&self.facet_plan, result))
    }

    /// Verify the configured index is searchable
    pub async fn check_ready(&self) -> SearchResult<()> {
        self.executor
            .backend()
            .check(&self.config.index_name)
            .await
            .map_err(SearchError::from)
    }
}
