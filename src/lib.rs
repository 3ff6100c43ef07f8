//! Faceted product search.
//!
//! A structured search request (free text plus attribute filters) is normalized,
//! translated into a weighted multi-field query with exact-match and price-range
//! filters, executed against the product index together with a fixed set of facet
//! aggregations, and assembled into a paginated, facet-annotated response.
//!
//! The offline [`ingestion`] batch rebuilds the index from a static JSON feed and
//! publishes it under a stable alias that the serving side queries.

pub mod api;
pub mod config;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod search;

pub use error::{AppError, Result};
