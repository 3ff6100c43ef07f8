use crate::models::OrderedMap;
use serde::{Deserialize, Serialize};

/// A product exactly as stored in the index.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Bucket label to document count, in backend order.
pub type BucketCounts = OrderedMap<u64>;

/// Facet name to buckets, in declaration order.
pub type Facets = OrderedMap<BucketCounts>;

/// Paginated search result with facet counts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    /// Number of matching documents, independent of paging
    pub total_hits: u64,

    /// Requested page of documents, best match first
    pub products: Vec<Document>,

    pub facets: Facets,
}
