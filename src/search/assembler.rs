//! Builds the client-facing response from a backend result.

use crate::models::{BucketCounts, Facets, SearchResponse};
use crate::search::backend::BackendResponse;
use crate::search::facets::FacetDeclaration;

/// Merge hits and facet buckets into a [`SearchResponse`].
///
/// Documents are passed through untouched and in order. Facets follow `plan`
/// order; a declared facet missing from `result` is left out, and one the
/// plan does not declare is dropped.
pub fn assemble(plan: &[FacetDeclaration], result: BackendResponse) -> SearchResponse {
    let BackendResponse {
        total_hits,
        documents,
        mut facets,
    } = result;

    let mut assembled = Facets::new();
    for declaration in plan {
        let Some(position) = facets.iter().position(|f| f.name == declaration.name) else {
            continue;
        };
        let buckets: BucketCounts = facets
            .swap_remove(position)
            .buckets
            .into_iter()
            .map(|bucket| (bucket.label, bucket.count))
            .collect();
        assembled.insert(declaration.name.clone(), buckets);
    }

    SearchResponse {
        total_hits,
        products: documents,
        facets: assembled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::search::backend::{Bucket, FacetResult};
    use crate::search::facets::plan_facets;
    use serde_json::json;

    fn document(id: &str) -> Document {
        json!({"id": id, "name": format!("Product {id}")})
            .as_object()
            .cloned()
            .unwrap()
    }

    fn facet(name: &str, buckets: &[(&str, u64)]) -> FacetResult {
        FacetResult {
            name: name.to_string(),
            buckets: buckets.iter().map(|(l, c)| Bucket::new(*l, *c)).collect(),
        }
    }

    #[test]
    fn test_hits_copied_verbatim_and_in_order() {
        let result = BackendResponse {
            total_hits: 42,
            documents: vec![document("9"), document("3")],
            facets: vec![],
        };

        let response = assemble(&plan_facets(), result);
        assert_eq!(response.total_hits, 42);
        assert_eq!(response.products, vec![document("9"), document("3")]);
    }

    #[test]
    fn test_facets_follow_plan_order_and_keep_bucket_order() {
        let result = BackendResponse {
            total_hits: 5,
            documents: vec![],
            facets: vec![
                facet("price_ranges", &[("0-50", 1), ("50-100", 2), ("100-200", 2), ("200+", 0)]),
                facet("categories", &[("shoes", 3), ("clothing", 2)]),
                facet("colors", &[("black", 2), ("blue", 1), ("grey", 1)]),
                facet("sizes", &[("42", 2), ("32", 1)]),
            ],
        };

        let response = assemble(&plan_facets(), result);
        assert_eq!(
            response.facets.keys().collect::<Vec<_>>(),
            vec!["colors", "sizes", "categories", "price_ranges"]
        );

        let colors = response.facets.get("colors").unwrap();
        assert_eq!(colors.keys().collect::<Vec<_>>(), vec!["black", "blue", "grey"]);

        let prices = response.facets.get("price_ranges").unwrap();
        assert_eq!(
            prices.iter().collect::<Vec<_>>(),
            vec![("0-50", &1), ("50-100", &2), ("100-200", &2), ("200+", &0)]
        );
    }

    #[test]
    fn test_absent_facets_are_omitted() {
        let result = BackendResponse {
            total_hits: 0,
            documents: vec![],
            facets: vec![facet("sizes", &[])],
        };

        let response = assemble(&plan_facets(), result);
        assert_eq!(response.facets.keys().collect::<Vec<_>>(), vec!["sizes"]);
        assert!(response.facets.get("sizes").unwrap().is_empty());
        assert!(!response.facets.contains_key("colors"));
    }

    #[test]
    fn test_undeclared_facets_are_dropped() {
        let result = BackendResponse {
            total_hits: 1,
            documents: vec![document("1")],
            facets: vec![facet("brands", &[("Nike", 1)]), facet("colors", &[("black", 1)])],
        };

        let response = assemble(&plan_facets(), result);
        assert_eq!(response.facets.keys().collect::<Vec<_>>(), vec!["colors"]);
    }
}
