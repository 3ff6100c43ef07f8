//! Error types for search operations

use crate::error::AppError;
use crate::search::backend::BackendError;

/// Result type for search operations
pub type SearchResult<T> = std::result::Result<T, SearchError>;

/// Errors that can occur while serving a search
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Request failed validation
    #[error("Invalid search request: {0}")]
    Validation(String),

    /// Index unreachable or missing
    #[error("Index unavailable: {0}")]
    BackendUnavailable(String),

    /// Index rejected or failed to run the query
    #[error("Search execution failed: {0}")]
    Backend(String),

    /// Backend did not answer within the deadline
    #[error("Search timed out after {0}ms")]
    Timeout(u64),
}

impl From<validator::ValidationErrors> for SearchError {
    fn from(err: validator::ValidationErrors) -> Self {
        SearchError::Validation(err.to_string())
    }
}

impl From<BackendError> for SearchError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(_) | BackendError::IndexNotFound(_) => {
                SearchError::BackendUnavailable(err.to_string())
            }
            BackendError::QueryRejected(_) | BackendError::Execution(_) => {
                SearchError::Backend(err.to_string())
            }
        }
    }
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::Validation(msg) => AppError::Validation(msg),
            SearchError::BackendUnavailable(msg) => AppError::BackendUnavailable(msg),
            SearchError::Backend(msg) => AppError::Backend(msg),
            SearchError::Timeout(_) => AppError::Timeout(err.to_string()),
        }
    }
}
