use serde::{Deserialize, Serialize};
use validator::Validate;

/// Inbound product search request.
///
/// Every field is optional. Paging defaults and blank-filter handling are
/// applied by [`crate::search::normalize`]; the signed paging fields let
/// out-of-range values reach validation instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Free text matched against name, brand and description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_text: Option<String>,

    /// Page size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "size must be at least 1"))]
    pub size: Option<i64>,

    /// Zero-based page number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "page must not be negative"))]
    pub page: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Exact product size, e.g. "42" or "L"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Inclusive lower price bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,

    /// Inclusive upper price bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
}

impl SearchRequest {
    /// Request matching the given free text
    pub fn text(query: impl Into<String>) -> Self {
        Self {
            query_text: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn with_page(mut self, page: i64, size: i64) -> Self {
        self.page = Some(page);
        self.size = Some(size);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_product_size(mut self, size: impl Into<String>) -> Self {
        self.product_size = Some(size.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }
}
