//! [`IndexBackend`] over embedded tantivy indexes managed by an [`IndexCatalog`]

use crate::models::Document;
use crate::search::analysis::analyze;
use crate::search::backend::{
    BackendError, BackendRequest, BackendResponse, Bucket, FacetResult, IndexBackend, SortOrder,
};
use crate::search::document::fields;
use crate::search::facets::{FacetDeclaration, FacetKind, RangeBoundary};
use crate::search::index::{IndexCatalog, IndexError};
use crate::search::query::QueryExpr;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::ops::Bound;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tantivy::aggregation::agg_req::Aggregations;
use tantivy::aggregation::AggregationCollector;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, ConstScoreQuery, DisjunctionMaxQuery, EmptyQuery, Occur,
    Query, RangeQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value as _};
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument, Term};
use tracing::debug;

impl From<IndexError> for BackendError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::NotFound(name) => BackendError::IndexNotFound(name),
            IndexError::Io(e) => BackendError::Unavailable(e.to_string()),
            IndexError::Tantivy(e) => BackendError::from(e),
            IndexError::InvalidAlias { .. } | IndexError::Manifest(_) => {
                BackendError::Execution(err.to_string())
            }
        }
    }
}

struct OpenedIndex {
    index: Index,
    reader: IndexReader,
    schema: Schema,
    source: Field,
    meta_modified: Option<SystemTime>,
}

impl OpenedIndex {
    fn field(&self, name: &str) -> Result<Field, BackendError> {
        Ok(self.schema.get_field(name)?)
    }

    fn source_of(&self, doc: &TantivyDocument) -> Result<Document, BackendError> {
        let raw = doc
            .get_first(self.source)
            .and_then(|v| v.as_str())
            .ok_or_else(|| BackendError::Execution("document has no stored source".into()))?;
        serde_json::from_str(raw)
            .map_err(|e| BackendError::Execution(format!("stored source is not a JSON object: {e}")))
    }
}

/// Shared, read-only handle onto the catalog's indexes.
///
/// Indexes are opened lazily on first use, so the service can start before
/// the first rebuild. A handle is reopened when the index metadata on disk
/// changes, which covers a rebuild replacing the physical index.
#[derive(Clone)]
pub struct TantivyBackend {
    inner: Arc<Inner>,
}

struct Inner {
    catalog: IndexCatalog,
    opened: RwLock<HashMap<String, Arc<OpenedIndex>>>,
}

impl TantivyBackend {
    pub fn new(index_root: impl Into<PathBuf>) -> Self {
        Self::with_catalog(IndexCatalog::new(index_root))
    }

    pub fn with_catalog(catalog: IndexCatalog) -> Self {
        Self {
            inner: Arc::new(Inner {
                catalog,
                opened: RwLock::new(HashMap::new()),
            }),
        }
    }

    async fn blocking<T, F>(&self, task: F) -> Result<T, BackendError>
    where
        T: Send + 'static,
        F: FnOnce(&Inner) -> Result<T, BackendError> + Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || task(&inner))
            .await
            .map_err(|e| BackendError::Execution(format!("search task failed: {e}")))?
    }
}

#[async_trait]
impl IndexBackend for TantivyBackend {
    async fn execute(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        let request = request.clone();
        self.blocking(move |inner| inner.execute(&request)).await
    }

    async fn check(&self, index: &str) -> Result<(), BackendError> {
        let index = index.to_string();
        self.blocking(move |inner| inner.open(&index).map(|_| ()))
            .await
    }
}

impl Inner {
    fn open(&self, name: &str) -> Result<Arc<OpenedIndex>, BackendError> {
        let physical = self.catalog.resolve(name)?;
        if !self.catalog.exists(&physical) {
            self.opened.write().remove(&physical);
            return Err(BackendError::IndexNotFound(name.to_string()));
        }

        let meta_modified = self.meta_modified(&physical);
        if let Some(opened) = self.opened.read().get(&physical) {
            if opened.meta_modified == meta_modified {
                return Ok(opened.clone());
            }
        }

        let index = self.catalog.open(&physical)?;
        let reader: IndexReader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::OnCommitWithDelay)
            .try_into()?;
        let schema = index.schema();
        let source = schema.get_field(fields::SOURCE)?;

        let opened = Arc::new(OpenedIndex {
            index,
            reader,
            schema,
            source,
            meta_modified,
        });
        debug!(index = %physical, "Opened index");
        self.opened.write().insert(physical, opened.clone());
        Ok(opened)
    }

    fn meta_modified(&self, physical: &str) -> Option<SystemTime> {
        std::fs::metadata(self.catalog.index_path(physical).join("meta.json"))
            .and_then(|meta| meta.modified())
            .ok()
    }

    fn execute(&self, request: &BackendRequest) -> Result<BackendResponse, BackendError> {
        if request.limit == 0 {
            return Err(BackendError::QueryRejected("limit must be positive".into()));
        }

        let opened = self.open(&request.index)?;
        let query = compile(&opened, &request.query)?;
        debug!(index = %request.index, query = ?query, "Compiled query");

        let top_docs = match request.sort {
            SortOrder::RelevanceDescending => {
                TopDocs::with_limit(request.limit).and_offset(request.offset)
            }
        };
        let collector = (
            Count,
            top_docs,
            AggregationCollector::from_aggs(aggregation_request(&request.facets)?, Default::default()),
        );

        let searcher = opened.reader.searcher();
        let (total_hits, top_docs, aggregations) = searcher.search(query.as_ref(), &collector)?;

        let mut documents = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            documents.push(opened.source_of(&doc)?);
        }

        let aggregations = serde_json::to_value(&aggregations)
            .map_err(|e| BackendError::Execution(format!("unreadable aggregation result: {e}")))?;

        Ok(BackendResponse {
            total_hits: total_hits as u64,
            documents,
            facets: read_facets(&request.facets, &aggregations),
        })
    }
}

fn compile(opened: &OpenedIndex, expr: &QueryExpr) -> Result<Box<dyn Query>, BackendError> {
    match expr {
        QueryExpr::TextMatch { fields, text } => {
            let mut disjuncts: Vec<Box<dyn Query>> = Vec::new();

            for weighted in fields {
                let field = opened.field(&weighted.field)?;
                let mut analyzer = opened.index.tokenizer_for_field(field)?;

                let mut tokens = analyze(&mut analyzer, text);
                let mut seen = std::collections::HashSet::new();
                tokens.retain(|t| seen.insert(t.clone()));
                if tokens.is_empty() {
                    continue;
                }

                let clauses: Vec<(Occur, Box<dyn Query>)> = tokens
                    .iter()
                    .map(|token| {
                        let term = Term::from_field_text(field, token);
                        let query: Box<dyn Query> =
                            Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                        (Occur::Should, query)
                    })
                    .collect();

                disjuncts.push(Box::new(BoostQuery::new(
                    Box::new(BooleanQuery::new(clauses)),
                    weighted.weight,
                )));
            }

            if disjuncts.is_empty() {
                // Nothing survived analysis: no document can match.
                Ok(Box::new(EmptyQuery))
            } else {
                Ok(Box::new(DisjunctionMaxQuery::new(disjuncts)))
            }
        }
        QueryExpr::Term { field, value } => {
            let term = Term::from_field_text(opened.field(field)?, value);
            Ok(Box::new(TermQuery::new(term, IndexRecordOption::Basic)))
        }
        QueryExpr::NumericRange { field, min, max } => {
            opened.field(field)?;
            let bound = |value: Option<f64>| value.map_or(Bound::Unbounded, Bound::Included);
            Ok(Box::new(RangeQuery::new_f64_bounds(
                field.clone(),
                bound(*min),
                bound(*max),
            )))
        }
        QueryExpr::Compound { must, filters } => {
            let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

            if let Some(must) = must {
                clauses.push((Occur::Must, compile(opened, must)?));
            }
            for filter in filters {
                let unscored = ConstScoreQuery::new(compile(opened, filter)?, 0.0);
                clauses.push((Occur::Must, Box::new(unscored)));
            }

            if clauses.is_empty() {
                Ok(Box::new(AllQuery))
            } else {
                Ok(Box::new(BooleanQuery::new(clauses)))
            }
        }
    }
}

fn aggregation_request(facets: &[FacetDeclaration]) -> Result<Aggregations, BackendError> {
    let mut request = Map::new();

    for facet in facets {
        let body = match &facet.kind {
            FacetKind::Terms { size } => json!({
                "terms": { "field": facet.field, "size": size }
            }),
            FacetKind::Range { ranges } => {
                let ranges: Vec<Value> = ranges
                    .iter()
                    .map(|range| {
                        let mut entry = Map::new();
                        entry.insert("key".into(), json!(range.label));
                        if let Some(from) = range.from {
                            entry.insert("from".into(), json!(from));
                        }
                        if let Some(to) = range.to {
                            entry.insert("to".into(), json!(to));
                        }
                        Value::Object(entry)
                    })
                    .collect();
                json!({ "range": { "field": facet.field, "ranges": ranges } })
            }
        };
        request.insert(facet.name.clone(), body);
    }

    serde_json::from_value(Value::Object(request))
        .map_err(|e| BackendError::QueryRejected(format!("invalid facet declaration: {e}")))
}

/// Pull declared facets out of the serialized aggregation result.
///
/// A facet with nothing to report is left out: terms facets without buckets
/// and range facets whose buckets are all zero, as over an empty corpus.
fn read_facets(declared: &[FacetDeclaration], results: &Value) -> Vec<FacetResult> {
    declared
        .iter()
        .filter_map(|facet| {
            let buckets = results.get(&facet.name)?.get("buckets")?.as_array()?;
            let buckets = match &facet.kind {
                FacetKind::Terms { .. } => terms_buckets(buckets),
                FacetKind::Range { ranges } => range_buckets(ranges, buckets),
            };
            if buckets.iter().all(|bucket| bucket.count == 0) {
                return None;
            }
            Some(FacetResult {
                name: facet.name.clone(),
                buckets,
            })
        })
        .collect()
}

fn terms_buckets(raw: &[Value]) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = raw
        .iter()
        .filter_map(|bucket| {
            let label = match bucket.get("key")? {
                Value::String(key) => key.clone(),
                other => other.to_string(),
            };
            Some(Bucket::new(label, bucket.get("doc_count")?.as_u64()?))
        })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    buckets
}

/// Declared ranges in declaration order. Buckets the engine adds to cover
/// values outside the declared boundaries are dropped.
fn range_buckets(declared: &[RangeBoundary], raw: &[Value]) -> Vec<Bucket> {
    declared
        .iter()
        .map(|range| {
            let count = raw
                .iter()
                .find(|bucket| is_bucket_for(range, bucket))
                .and_then(|bucket| bucket.get("doc_count")?.as_u64())
                .unwrap_or(0);
            Bucket::new(range.label.clone(), count)
        })
        .collect()
}

fn is_bucket_for(range: &RangeBoundary, bucket: &Value) -> bool {
    if bucket.get("key").and_then(Value::as_str) == Some(range.label.as_str()) {
        return true;
    }
    let bound = |name: &str| bucket.get(name).and_then(Value::as_f64);
    bound("from") == range.from && bound("to") == range.to
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::facets::plan_facets;
    use crate::search::query::RELEVANCE_FIELDS;

    #[test]
    fn test_aggregation_request_accepts_plan() {
        assert!(aggregation_request(&plan_facets()).is_ok());
    }

    #[test]
    fn test_range_buckets_drop_gaps_and_keep_declared_order() {
        let FacetKind::Range { ranges } = &plan_facets()[3].kind else {
            panic!("price_ranges must be a range facet");
        };
        let raw = json!([
            {"key": "*-0", "to": 0.0, "doc_count": 0},
            {"key": "0-50", "from": 0.0, "to": 50.0, "doc_count": 1},
            {"key": "50-100", "from": 50.0, "to": 100.0, "doc_count": 2},
            {"key": "100-200", "from": 100.0, "to": 200.0, "doc_count": 2},
            {"key": "200+", "from": 200.0, "doc_count": 0}
        ]);

        let buckets = range_buckets(ranges, raw.as_array().unwrap());
        assert_eq!(
            buckets,
            vec![
                Bucket::new("0-50", 1),
                Bucket::new("50-100", 2),
                Bucket::new("100-200", 2),
                Bucket::new("200+", 0),
            ]
        );
    }

    #[test]
    fn test_terms_buckets_sorted_by_count_then_label() {
        let raw = json!([
            {"key": "grey", "doc_count": 1},
            {"key": "black", "doc_count": 2},
            {"key": "blue", "doc_count": 1}
        ]);

        let buckets = terms_buckets(raw.as_array().unwrap());
        assert_eq!(
            buckets,
            vec![
                Bucket::new("black", 2),
                Bucket::new("blue", 1),
                Bucket::new("grey", 1),
            ]
        );
    }

    #[test]
    fn test_missing_facets_are_skipped() {
        let results = json!({"colors": {"buckets": [{"key": "black", "doc_count": 1}]}});
        let facets = read_facets(&plan_facets(), &results);
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].name, "colors");
    }

    #[test]
    fn test_facets_without_counts_are_omitted() {
        let results = json!({
            "colors": {"buckets": []},
            "sizes": {"buckets": [{"key": "42", "doc_count": 1}]},
            "categories": {"buckets": []},
            "price_ranges": {"buckets": [
                {"key": "0-50", "from": 0.0, "to": 50.0, "doc_count": 0},
                {"key": "50-100", "from": 50.0, "to": 100.0, "doc_count": 0},
                {"key": "100-200", "from": 100.0, "to": 200.0, "doc_count": 0},
                {"key": "200+", "from": 200.0, "doc_count": 0}
            ]}
        });

        let facets = read_facets(&plan_facets(), &results);
        let names: Vec<_> = facets.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["sizes"]);
    }

    #[test]
    fn test_partly_empty_range_facet_is_kept() {
        let results = json!({
            "price_ranges": {"buckets": [
                {"key": "0-50", "from": 0.0, "to": 50.0, "doc_count": 0},
                {"key": "200+", "from": 200.0, "doc_count": 3}
            ]}
        });

        let facets = read_facets(&plan_facets(), &results);
        assert_eq!(facets.len(), 1);
        assert_eq!(facets[0].buckets.len(), 4);
        assert_eq!(facets[0].buckets[3], Bucket::new("200+", 3));
    }

    fn opened_index(dir: &tempfile::TempDir) -> Arc<OpenedIndex> {
        let backend = TantivyBackend::new(dir.path());
        backend.inner.catalog.create("product_index").unwrap();
        backend.inner.open("product_index").unwrap()
    }

    #[test]
    fn test_text_match_takes_best_single_field() {
        let dir = tempfile::TempDir::new().unwrap();
        let opened = opened_index(&dir);

        let compiled = compile(&opened, &QueryExpr::text_match("nike air max")).unwrap();

        assert!(compiled.downcast_ref::<DisjunctionMaxQuery>().is_some());
        assert!(compiled.downcast_ref::<BooleanQuery>().is_none());
        let rendered = format!("{compiled:?}");
        assert_eq!(rendered.matches("Boost(").count(), RELEVANCE_FIELDS.len());
    }

    #[test]
    fn test_text_without_tokens_matches_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let opened = opened_index(&dir);

        let compiled = compile(&opened, &QueryExpr::text_match("  !! ")).unwrap();
        assert!(compiled.downcast_ref::<EmptyQuery>().is_some());
    }

    #[tokio::test]
    async fn test_missing_index_is_reported() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = TantivyBackend::new(dir.path());

        let err = backend.check("product_index_alias").await.unwrap_err();
        assert!(matches!(err, BackendError::IndexNotFound(_)));
    }
}
