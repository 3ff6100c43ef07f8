pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::search::ProductSearchService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<ProductSearchService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(search: Arc<ProductSearchService>) -> Self {
        Self {
            search,
            started_at: Instant::now(),
        }
    }
}
