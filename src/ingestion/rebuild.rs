use super::IngestionError;
use crate::config::IngestionConfig;
use crate::metrics::DOCUMENTS_INDEXED_TOTAL;
use crate::search::document::{ProductDocument, SearchDocument};
use crate::search::index::IndexCatalog;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tantivy::{Index, IndexWriter, Term};
use tracing::{error, info, warn};

/// Outcome of a successful rebuild
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub index: String,
    pub alias: String,
    pub documents_indexed: usize,
    pub completed_at: DateTime<Utc>,
}

/// Read and validate the whole feed before anything on disk changes
pub fn load_feed(path: &Path) -> Result<Vec<ProductDocument>, IngestionError> {
    let raw = std::fs::read(path).map_err(|source| IngestionError::FeedRead {
        path: path.to_path_buf(),
        source,
    })?;

    let entries: Vec<Value> =
        serde_json::from_slice(&raw).map_err(|e| IngestionError::FeedFormat(e.to_string()))?;

    entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| {
            ProductDocument::from_json(entry)
                .map_err(|source| IngestionError::Document { position, source })
        })
        .collect()
}

/// Rebuilds one physical index and points the alias at it
pub struct IndexRebuilder {
    catalog: IndexCatalog,
    config: IngestionConfig,
}

impl IndexRebuilder {
    pub fn new(catalog: IndexCatalog, config: IngestionConfig) -> Self {
        Self { catalog, config }
    }

    /// Replace the index with the feed contents. Idempotent: the same feed
    /// always produces the same index.
    pub fn rebuild_index(&self) -> Result<IngestionReport, IngestionError> {
        let name = self.config.index_name.as_str();
        let alias = self.config.alias.as_str();

        let products = load_feed(&self.config.feed_path)?;
        info!(
            feed = %self.config.feed_path.display(),
            products = products.len(),
            "Loaded product feed"
        );

        if self.catalog.exists(name) {
            info!(index = name, "Index exists, deleting");
        }
        // Also clears leftovers from an interrupted run.
        self.catalog.delete(name)?;

        let index = self.catalog.create(name)?;
        let indexed = match self.bulk_load(&index, &products) {
            Ok(indexed) => indexed,
            Err(e) => {
                error!(index = name, error = %e, "Bulk load failed, removing partial index");
                if let Err(cleanup) = self.catalog.delete(name) {
                    warn!(index = name, error = %cleanup, "Failed to remove partial index");
                }
                return Err(e);
            }
        };

        self.catalog.assign_alias(alias, name)?;
        DOCUMENTS_INDEXED_TOTAL.inc_by(indexed as u64);

        info!(
            root = %self.catalog.root().display(),
            index = name,
            alias,
            documents = indexed,
            "Index rebuilt"
        );
        Ok(IngestionReport {
            index: name.to_string(),
            alias: alias.to_string(),
            documents_indexed: indexed,
            completed_at: Utc::now(),
        })
    }

    fn bulk_load(&self, index: &Index, products: &[ProductDocument]) -> Result<usize, IngestionError> {
        let schema = index.schema();
        let id_field = schema.get_field(crate::search::document::fields::ID)?;

        // One thread keeps documents in feed order within a single segment.
        let mut writer: IndexWriter = index.writer_with_num_threads(1, self.config.writer_heap_size)?;

        for product in products {
            writer.delete_term(Term::from_field_text(id_field, &product.document_id()));
            writer.add_document(product.to_tantivy_doc(&schema))?;
        }

        writer.commit()?;
        writer.wait_merging_threads()?;
        info!(documents = products.len(), "Committed bulk load");

        Ok(products.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::document::DocumentError;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config(dir: &TempDir, feed: &str) -> IngestionConfig {
        let feed_path = dir.path().join("feed.json");
        std::fs::write(&feed_path, feed).unwrap();
        IngestionConfig {
            feed_path,
            ..Default::default()
        }
    }

    #[test]
    fn test_rebuild_publishes_alias() {
        let dir = TempDir::new().unwrap();
        let catalog = IndexCatalog::new(dir.path().join("indexes"));
        let rebuilder = IndexRebuilder::new(
            catalog.clone(),
            config(&dir, r#"[{"id": "1", "name": "Nike Air"}, {"id": 2, "price": 5}]"#),
        );

        let report = rebuilder.rebuild_index().unwrap();
        assert_eq!(report.documents_indexed, 2);
        assert_eq!(report.index, "product_index");
        assert_eq!(catalog.resolve("product_index_alias").unwrap(), "product_index");
    }

    #[test]
    fn test_bad_entry_aborts_before_touching_index() {
        let dir = TempDir::new().unwrap();
        let catalog = IndexCatalog::new(dir.path().join("indexes"));

        IndexRebuilder::new(catalog.clone(), config(&dir, r#"[{"id": "1"}]"#))
            .rebuild_index()
            .unwrap();

        let err = IndexRebuilder::new(catalog.clone(), config(&dir, r#"[{"id": "1"}, "oops"]"#))
            .rebuild_index()
            .unwrap_err();
        assert!(matches!(
            err,
            IngestionError::Document {
                position: 1,
                source: DocumentError::NotAnObject
            }
        ));
        assert!(catalog.exists("product_index"));
    }

    #[test]
    fn test_missing_feed() {
        let dir = TempDir::new().unwrap();
        let rebuilder = IndexRebuilder::new(
            IndexCatalog::new(dir.path()),
            IngestionConfig {
                feed_path: PathBuf::from("/nonexistent/products.json"),
                ..Default::default()
            },
        );
        assert!(matches!(
            rebuilder.rebuild_index(),
            Err(IngestionError::FeedRead { .. })
        ));
    }

    #[test]
    fn test_feed_must_be_an_array() {
        let dir = TempDir::new().unwrap();
        let err = load_feed(&config(&dir, r#"{"id": "1"}"#).feed_path).unwrap_err();
        assert!(matches!(err, IngestionError::FeedFormat(_)));
    }
}
