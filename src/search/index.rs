//! On-disk catalog of product indexes and the aliases that point at them

use crate::search::analysis::register_analyzers;
use crate::search::document::build_product_schema;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tantivy::Index;
use tracing::{debug, info};

/// Alias manifest file, relative to the catalog root
pub const ALIAS_MANIFEST: &str = "aliases.json";

pub type IndexResult<T> = std::result::Result<T, IndexError>;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index not found: {0}")]
    NotFound(String),

    #[error("invalid alias `{alias}`: {reason}")]
    InvalidAlias { alias: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("alias manifest is unreadable: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
}

/// Physical indexes live in `<root>/<name>/`; `<root>/aliases.json` maps
/// alias names to physical index names.
#[derive(Debug, Clone)]
pub struct IndexCatalog {
    root: PathBuf,
}

impl IndexCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Whether a physical index named `name` has been committed
    pub fn exists(&self, name: &str) -> bool {
        self.index_path(name).join("meta.json").exists()
    }

    pub fn delete(&self, name: &str) -> IndexResult<()> {
        let path = self.index_path(name);
        if path.exists() {
            fs::remove_dir_all(&path)?;
            info!(index = name, path = %path.display(), "Deleted index");
        }
        Ok(())
    }

    /// Create an empty index with the product schema and analyzers
    pub fn create(&self, name: &str) -> IndexResult<Index> {
        let path = self.index_path(name);
        fs::create_dir_all(&path)?;

        let index = Index::create_in_dir(&path, build_product_schema())?;
        register_analyzers(&index);
        info!(index = name, path = %path.display(), "Created index");
        Ok(index)
    }

    /// Open a physical index or alias
    pub fn open(&self, name: &str) -> IndexResult<Index> {
        let physical = self.resolve(name)?;
        if !self.exists(&physical) {
            return Err(IndexError::NotFound(name.to_string()));
        }

        let index = Index::open_in_dir(self.index_path(&physical))?;
        register_analyzers(&index);
        debug!(name, physical = %physical, "Opened index");
        Ok(index)
    }

    pub fn aliases(&self) -> IndexResult<BTreeMap<String, String>> {
        let path = self.root.join(ALIAS_MANIFEST);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_slice(&fs::read(path)?)?)
    }

    /// Map `alias` to `index`, replacing any previous target
    pub fn assign_alias(&self, alias: &str, index: &str) -> IndexResult<()> {
        if alias == index || self.exists(alias) {
            return Err(IndexError::InvalidAlias {
                alias: alias.to_string(),
                reason: "an index with this name exists".to_string(),
            });
        }
        if !self.exists(index) {
            return Err(IndexError::NotFound(index.to_string()));
        }

        let mut aliases = self.aliases()?;
        let previous = aliases.insert(alias.to_string(), index.to_string());

        fs::create_dir_all(&self.root)?;
        let staged = self.root.join(format!("{ALIAS_MANIFEST}.tmp"));
        fs::write(&staged, serde_json::to_vec_pretty(&aliases)?)?;
        fs::rename(&staged, self.root.join(ALIAS_MANIFEST))?;

        info!(alias, index, previous = ?previous, "Assigned alias");
        Ok(())
    }

    /// Physical index name behind `name`, which may itself be physical
    pub fn resolve(&self, name: &str) -> IndexResult<String> {
        Ok(self
            .aliases()?
            .remove(name)
            .unwrap_or_else(|| name.to_string()))
    }
}
