//! Facet declarations run alongside every search.

use crate::search::document::fields;

/// Bucket limit for terms facets
pub const TERMS_FACET_SIZE: u32 = 20;

/// One labelled `[from, to)` bucket of a range facet. A missing bound is open.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBoundary {
    pub label: String,
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl RangeBoundary {
    pub fn new(label: impl Into<String>, from: Option<f64>, to: Option<f64>) -> Self {
        Self {
            label: label.into(),
            from,
            to,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FacetKind {
    /// Most frequent values, descending by count
    Terms { size: u32 },
    /// Explicit buckets, reported in declaration order
    Range { ranges: Vec<RangeBoundary> },
}

/// A named aggregation over one index field
#[derive(Debug, Clone, PartialEq)]
pub struct FacetDeclaration {
    pub name: String,
    pub field: String,
    pub kind: FacetKind,
}

impl FacetDeclaration {
    pub fn terms(name: &str, field: &str, size: u32) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
            kind: FacetKind::Terms { size },
        }
    }

    pub fn range(name: &str, field: &str, ranges: Vec<RangeBoundary>) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
            kind: FacetKind::Range { ranges },
        }
    }
}

/// The fixed facet plan, in output order.
///
/// There is deliberately no `brands` facet; consumers asking for one get no
/// such key.
pub fn plan_facets() -> Vec<FacetDeclaration> {
    vec![
        FacetDeclaration::terms("colors", fields::COLOR, TERMS_FACET_SIZE),
        FacetDeclaration::terms("sizes", fields::SIZE, TERMS_FACET_SIZE),
        FacetDeclaration::terms("categories", fields::CATEGORY, TERMS_FACET_SIZE),
        FacetDeclaration::range(
            "price_ranges",
            fields::PRICE,
            vec![
                RangeBoundary::new("0-50", Some(0.0), Some(50.0)),
                RangeBoundary::new("50-100", Some(50.0), Some(100.0)),
                RangeBoundary::new("100-200", Some(100.0), Some(200.0)),
                RangeBoundary::new("200+", Some(200.0), None),
            ],
        ),
    ]
}
