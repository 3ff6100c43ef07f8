//! Offline index rebuild from a static product feed
//!
//! The batch runs: existence check → delete → create with schema and
//! analyzers → bulk load → commit → alias assignment. It runs alone; the
//! serving side only ever sees the alias.

mod rebuild;

pub use rebuild::{load_feed, IndexRebuilder, IngestionReport};

use crate::error::AppError;
use crate::search::document::DocumentError;
use crate::search::index::IndexError;
use std::path::PathBuf;

/// Errors that abort an index rebuild
#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("failed to read feed {path}: {source}")]
    FeedRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("feed is not a JSON array of products: {0}")]
    FeedFormat(String),

    #[error("feed entry {position}: {source}")]
    Document {
        position: usize,
        source: DocumentError,
    },

    #[error("index operation failed: {0}")]
    Index(#[from] IndexError),

    #[error("indexing failed: {0}")]
    Indexing(#[from] tantivy::TantivyError),
}

impl From<IngestionError> for AppError {
    fn from(err: IngestionError) -> Self {
        AppError::Ingestion(err.to_string())
    }
}
