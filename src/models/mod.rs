pub mod ordered;
pub mod request;
pub mod response;

pub use ordered::OrderedMap;
pub use request::SearchRequest;
pub use response::{BucketCounts, Document, Facets, SearchResponse};
