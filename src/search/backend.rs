//! Contract between the search core and the index that executes queries.

use crate::models::Document;
use crate::search::facets::FacetDeclaration;
use crate::search::query::QueryExpr;
use async_trait::async_trait;

/// Result ordering. Ties keep the index's own document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    RelevanceDescending,
}

/// One search as submitted to the backend
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// Index name or alias to search
    pub index: String,
    pub query: QueryExpr,
    pub facets: Vec<FacetDeclaration>,
    pub offset: usize,
    pub limit: usize,
    pub sort: SortOrder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub count: u64,
}

impl Bucket {
    pub fn new(label: impl Into<String>, count: u64) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// Buckets for one declared facet, in the order the backend produced them
#[derive(Debug, Clone, PartialEq)]
pub struct FacetResult {
    pub name: String,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackendResponse {
    pub total_hits: u64,
    pub documents: Vec<Document>,
    pub facets: Vec<FacetResult>,
}

/// Backend faults, kept apart from a successful empty result.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BackendError {
    /// Connectivity or I/O fault; worth retrying
    #[error("index unavailable: {0}")]
    Unavailable(String),

    #[error("index not found: {0}")]
    IndexNotFound(String),

    #[error("query rejected: {0}")]
    QueryRejected(String),

    #[error("execution failed: {0}")]
    Execution(String),
}

impl BackendError {
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }
}

impl From<tantivy::TantivyError> for BackendError {
    fn from(err: tantivy::TantivyError) -> Self {
        use tantivy::TantivyError;

        match err {
            TantivyError::IoError(_)
            | TantivyError::OpenReadError(_)
            | TantivyError::OpenDirectoryError(_) => BackendError::Unavailable(err.to_string()),
            TantivyError::FieldNotFound(_)
            | TantivyError::InvalidArgument(_)
            | TantivyError::SchemaError(_)
            | TantivyError::AggregationError(_) => BackendError::QueryRejected(err.to_string()),
            _ => BackendError::Execution(err.to_string()),
        }
    }
}

/// An index able to run a query with facet aggregations.
///
/// Implementations are shared across concurrent requests and must not hold
/// per-request mutable state.
#[async_trait]
pub trait IndexBackend: Send + Sync {
    async fn execute(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError>;

    /// Confirm that `index` resolves to a searchable index
    async fn check(&self, index: &str) -> Result<(), BackendError>;
}
