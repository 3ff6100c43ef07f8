//! Query expression tree and its construction from a normalized request.

use crate::search::document::fields;
use crate::search::normalize::NormalizedRequest;

/// Fields searched by free text, with their boosts. Scoring takes the best
/// single field rather than the sum.
pub const RELEVANCE_FIELDS: [(&str, f32); 5] = [
    (fields::NAME, 2.0),
    (fields::NAME_SHINGLES, 1.5),
    (fields::BRAND, 1.5),
    (fields::BRAND_SHINGLES, 1.0),
    (fields::DESCRIPTION, 1.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedField {
    pub field: String,
    pub weight: f32,
}

/// Immutable search expression handed to the index backend.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryExpr {
    /// Analyzed text matched against several weighted fields, best field wins
    TextMatch {
        fields: Vec<WeightedField>,
        text: String,
    },

    /// Exact equality on a keyword field
    Term { field: String, value: String },

    /// Inclusive numeric bounds, each optional
    NumericRange {
        field: String,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// Every filter must hold; `must` (when present) supplies the score.
    /// With neither, everything matches.
    Compound {
        must: Option<Box<QueryExpr>>,
        filters: Vec<QueryExpr>,
    },
}

impl QueryExpr {
    pub fn text_match(text: &str) -> Self {
        QueryExpr::TextMatch {
            fields: RELEVANCE_FIELDS
                .iter()
                .map(|(field, weight)| WeightedField {
                    field: field.to_string(),
                    weight: *weight,
                })
                .collect(),
            text: text.to_string(),
        }
    }

    pub fn term(field: &str, value: &str) -> Self {
        QueryExpr::Term {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Translate a normalized request into a compound query.
pub fn build_query(request: &NormalizedRequest) -> QueryExpr {
    let must = request
        .query_text
        .as_deref()
        .map(|text| Box::new(QueryExpr::text_match(text)));

    let exact = [
        (fields::COLOR, &request.color),
        (fields::SIZE, &request.product_size),
        (fields::BRAND_EXACT, &request.brand),
        (fields::CATEGORY, &request.category),
    ];

    let price = (request.min_price.is_some() || request.max_price.is_some()).then(|| {
        QueryExpr::NumericRange {
            field: fields::PRICE.to_string(),
            min: request.min_price,
            max: request.max_price,
        }
    });

    let filters = exact
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| QueryExpr::term(field, v)))
        .chain(price)
        .collect();

    QueryExpr::Compound { must, filters }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchRequest;
    use crate::search::config::SearchConfig;
    use crate::search::normalize::normalize;

    fn build(request: SearchRequest) -> QueryExpr {
        build_query(&normalize(request, &SearchConfig::default()).unwrap())
    }

    #[test]
    fn test_no_text_no_filters_matches_everything() {
        assert_eq!(
            build(SearchRequest::default()),
            QueryExpr::Compound {
                must: None,
                filters: vec![],
            }
        );
    }

    #[test]
    fn test_text_uses_weighted_fields() {
        let QueryExpr::Compound { must, filters } = build(SearchRequest::text("nike air max"))
        else {
            panic!("expected compound query");
        };
        assert!(filters.is_empty());

        let Some(QueryExpr::TextMatch { fields, text }) = must.map(|m| *m) else {
            panic!("expected text match");
        };
        assert_eq!(text, "nike air max");
        let weights: Vec<_> = fields.iter().map(|f| (f.field.as_str(), f.weight)).collect();
        assert_eq!(
            weights,
            vec![
                ("name", 2.0),
                ("name_shingles", 1.5),
                ("brand", 1.5),
                ("brand_shingles", 1.0),
                ("description", 1.0),
            ]
        );
    }

    #[test]
    fn test_filters_are_conjunctive_and_ordered() {
        let query = build(
            SearchRequest::default()
                .with_color("black")
                .with_product_size("42")
                .with_brand("Nike")
                .with_category("shoes")
                .with_price_range(Some(100.0), Some(150.0)),
        );

        let QueryExpr::Compound { must, filters } = query else {
            panic!("expected compound query");
        };
        assert!(must.is_none());
        assert_eq!(
            filters,
            vec![
                QueryExpr::term("color", "black"),
                QueryExpr::term("size", "42"),
                QueryExpr::term("brand_exact", "Nike"),
                QueryExpr::term("category", "shoes"),
                QueryExpr::NumericRange {
                    field: "price".into(),
                    min: Some(100.0),
                    max: Some(150.0),
                },
            ]
        );
    }

    #[test]
    fn test_single_price_bound() {
        let QueryExpr::Compound { filters, .. } =
            build(SearchRequest::default().with_price_range(None, Some(50.0)))
        else {
            panic!("expected compound query");
        };
        assert_eq!(
            filters,
            vec![QueryExpr::NumericRange {
                field: "price".into(),
                min: None,
                max: Some(50.0),
            }]
        );
    }

    #[test]
    fn test_blank_filter_is_skipped() {
        let QueryExpr::Compound { filters, .. } =
            build(SearchRequest::default().with_color("  ").with_category("shoes"))
        else {
            panic!("expected compound query");
        };
        assert_eq!(filters, vec![QueryExpr::term("category", "shoes")]);
    }
}
