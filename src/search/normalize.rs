//! Request normalization: defaults, blank-filter handling and paging bounds.

use crate::models::SearchRequest;
use crate::search::config::SearchConfig;
use crate::search::error::{SearchError, SearchResult};
use tracing::debug;
use validator::Validate;

/// A validated request with defaults applied and blank strings removed.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequest {
    pub query_text: Option<String>,
    pub page: usize,
    pub size: usize,
    pub color: Option<String>,
    pub product_size: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl NormalizedRequest {
    /// Result-set offset, `page * size`
    pub fn offset(&self) -> usize {
        self.page * self.size
    }
}

/// Validate `request` and apply defaults from `config`.
pub fn normalize(request: SearchRequest, config: &SearchConfig) -> SearchResult<NormalizedRequest> {
    if let Err(err) = request.validate() {
        debug!(error = %err, "Rejecting search request");
        return Err(err.into());
    }

    let size = request.size.unwrap_or(i64::from(config.default_page_size));
    if size > i64::from(config.max_page_size) {
        return Err(reject(format!(
            "size: must not exceed {}",
            config.max_page_size
        )));
    }
    let page = request.page.unwrap_or(0);

    // Both are non-negative here, so the casts are lossless.
    let window = (page as u64)
        .checked_mul(size as u64)
        .and_then(|offset| offset.checked_add(size as u64))
        .filter(|end| *end <= config.max_result_window)
        .ok_or_else(|| {
            reject(format!(
                "page: page * size + size must not exceed {}",
                config.max_result_window
            ))
        })?;
    debug!(page, size, window, "Normalized paging");

    Ok(NormalizedRequest {
        query_text: non_blank(request.query_text),
        page: page as usize,
        size: size as usize,
        color: non_blank(request.color),
        product_size: non_blank(request.product_size),
        brand: non_blank(request.brand),
        category: non_blank(request.category),
        min_price: request.min_price,
        max_price: request.max_price,
    })
}

fn reject(message: String) -> SearchError {
    debug!(reason = %message, "Rejecting search request");
    SearchError::Validation(message)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
