//! Runs backend requests under a deadline with bounded retry.

use crate::metrics::BACKEND_RETRIES_TOTAL;
use crate::search::backend::{BackendError, BackendRequest, BackendResponse, IndexBackend};
use crate::search::config::BackendConfig;
use crate::search::error::{SearchError, SearchResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, warn};

/// Submits searches to an [`IndexBackend`].
///
/// Transient faults are retried up to `max_retries` times with exponential
/// backoff. The whole exchange, retries included, is bounded by
/// `request_timeout_ms`. Every failure surfaces as a [`SearchError`]; an
/// empty successful result is never substituted.
pub struct SearchExecutor {
    backend: Arc<dyn IndexBackend>,
    policy: BackendConfig,
}

impl SearchExecutor {
    pub fn new(backend: Arc<dyn IndexBackend>, policy: BackendConfig) -> Self {
        Self { backend, policy }
    }

    pub fn backend(&self) -> &Arc<dyn IndexBackend> {
        &self.backend
    }

    pub async fn execute(&self, request: &BackendRequest) -> SearchResult<BackendResponse> {
        let deadline = self.policy.request_timeout();

        match tokio::time::timeout(deadline, self.execute_with_retry(request)).await {
            Ok(result) => result.map_err(SearchError::from),
            Err(_) => {
                error!(
                    index = %request.index,
                    timeout_ms = self.policy.request_timeout_ms,
                    "Index backend timed out"
                );
                Err(SearchError::Timeout(self.policy.request_timeout_ms))
            }
        }
    }

    async fn execute_with_retry(
        &self,
        request: &BackendRequest,
    ) -> Result<BackendResponse, BackendError> {
        let max_attempts = self.policy.max_retries + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;

            debug!(
                index = %request.index,
                attempt = attempt,
                max_attempts = max_attempts,
                offset = request.offset,
                limit = request.limit,
                "Executing search attempt"
            );

            match self.backend.execute(request).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let backoff = calculate_backoff(&self.policy, attempt - 1);
                    warn!(
                        index = %request.index,
                        attempt = attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Transient backend fault, retrying"
                    );
                    BACKEND_RETRIES_TOTAL.inc();
                    sleep(backoff).await;
                }
                Err(e) => {
                    error!(
                        index = %request.index,
                        attempt = attempt,
                        error = %e,
                        "Index backend execution failed"
                    );
                    return Err(e);
                }
            }
        }
    }
}

/// Exponential backoff: `retry_backoff_ms * 2^retry`, capped at `max_backoff_ms`
fn calculate_backoff(policy: &BackendConfig, retry: u32) -> Duration {
    let factor = 2_u64.checked_pow(retry).unwrap_or(u64::MAX);
    let millis = policy
        .retry_backoff_ms
        .saturating_mul(factor)
        .min(policy.max_backoff_ms);
    Duration::from_millis(millis)
}
