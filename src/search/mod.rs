//! Faceted product search over a tantivy index
//!
//! A request flows through these stages:
//!
//! ```text
//! SearchRequest
//!      │
//!      ▼
//! ┌──────────────┐   defaults, blank filters dropped, paging validated
//! │  normalize   │
//! └──────────────┘
//!      │
//!      ├──────────────────────┐
//!      ▼                      ▼
//! ┌──────────────┐     ┌──────────────┐
//! │ build_query  │     │ plan_facets  │   colors, sizes, categories, price_ranges
//! └──────────────┘     └──────────────┘
//!      │                      │
//!      └──────────┬───────────┘
//!                 ▼
//! ┌──────────────────────────────┐   deadline + bounded retry
//! │ SearchExecutor → IndexBackend│
//! └──────────────────────────────┘
//!                 │
//!                 ▼
//! ┌──────────────┐
//! │   assemble   │   totalHits, products, ordered facets
//! └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use product_search::models::SearchRequest;
//! use product_search::search::{BackendConfig, ProductSearchService, SearchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service =
//!         ProductSearchService::with_tantivy(SearchConfig::default(), BackendConfig::default());
//!
//!     let response = service
//!         .search(SearchRequest::text("nike air max").with_color("black"))
//!         .await?;
//!
//!     println!("{} matches", response.total_hits);
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod assembler;
pub mod backend;
pub mod config;
pub mod document;
pub mod error;
pub mod executor;
pub mod facets;
pub mod index;
pub mod normalize;
pub mod query;
pub mod service;
pub mod tantivy_backend;

pub use backend::{BackendError, BackendRequest, BackendResponse, IndexBackend};
pub use config::{BackendConfig, SearchConfig, SearchConfigBuilder};
pub use error::{SearchError, SearchResult};
pub use facets::{plan_facets, FacetDeclaration, FacetKind};
pub use index::IndexCatalog;
pub use query::{build_query, QueryExpr};
pub use service::ProductSearchService;
pub use tantivy_backend::TantivyBackend;
