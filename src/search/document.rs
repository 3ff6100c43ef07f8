//! Product schema and feed-document conversion

use crate::models::Document;
use crate::search::analysis::SHINGLE_ANALYZER;
use serde_json::Value;
use tantivy::schema::{
    IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED, STRING, TEXT,
};
use tantivy::TantivyDocument;

/// Index field names shared by ingestion and querying
pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const NAME_SHINGLES: &str = "name_shingles";
    pub const BRAND: &str = "brand";
    pub const BRAND_SHINGLES: &str = "brand_shingles";
    /// Untokenized brand, for exact filtering
    pub const BRAND_EXACT: &str = "brand_exact";
    pub const DESCRIPTION: &str = "description";
    pub const COLOR: &str = "color";
    pub const SIZE: &str = "size";
    pub const CATEGORY: &str = "category";
    pub const PRICE: &str = "price";
    /// Original feed object, stored as JSON text
    pub const SOURCE: &str = "_source";
}

/// Trait for documents that can be indexed and searched
pub trait SearchDocument {
    /// Convert to Tantivy document
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument;

    /// Get document ID
    fn document_id(&self) -> String;
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DocumentError {
    #[error("feed entry is not a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// One product from the feed, with the fields the index understands pulled out
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDocument {
    pub id: String,
    pub name: Option<String>,
    pub brand: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    source: String,
}

impl ProductDocument {
    pub fn from_json(value: Value) -> Result<Self, DocumentError> {
        let Value::Object(object) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let id = match object.get(fields::ID) {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            Some(_) => {
                return Err(DocumentError::InvalidField {
                    field: fields::ID,
                    expected: "a string or number",
                })
            }
            None => return Err(DocumentError::MissingField(fields::ID)),
        };

        let price = match object.get(fields::PRICE) {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => {
                return Err(DocumentError::InvalidField {
                    field: fields::PRICE,
                    expected: "a number",
                })
            }
        };

        Ok(Self {
            id,
            name: text_field(&object, fields::NAME)?,
            brand: text_field(&object, fields::BRAND)?,
            description: text_field(&object, fields::DESCRIPTION)?,
            color: text_field(&object, fields::COLOR)?,
            size: text_field(&object, fields::SIZE)?,
            category: text_field(&object, fields::CATEGORY)?,
            price,
            source: Value::Object(object).to_string(),
        })
    }

    /// Verbatim JSON text of the feed object, as stored in `_source`
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn text_field(object: &Document, field: &'static str) -> Result<Option<String>, DocumentError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DocumentError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

impl SearchDocument for ProductDocument {
    fn to_tantivy_doc(&self, schema: &Schema) -> TantivyDocument {
        let mut doc = TantivyDocument::new();
        let mut add_text = |name: &str, value: &str| {
            if let Ok(field) = schema.get_field(name) {
                doc.add_text(field, value);
            }
        };

        add_text(fields::ID, &self.id);
        add_text(fields::SOURCE, &self.source);

        if let Some(name) = &self.name {
            add_text(fields::NAME, name);
            add_text(fields::NAME_SHINGLES, name);
        }
        if let Some(brand) = &self.brand {
            add_text(fields::BRAND, brand);
            add_text(fields::BRAND_SHINGLES, brand);
            add_text(fields::BRAND_EXACT, brand);
        }
        if let Some(description) = &self.description {
            add_text(fields::DESCRIPTION, description);
        }
        if let Some(color) = &self.color {
            add_text(fields::COLOR, color);
        }
        if let Some(size) = &self.size {
            add_text(fields::SIZE, size);
        }
        if let Some(category) = &self.category {
            add_text(fields::CATEGORY, category);
        }

        if let (Some(price), Ok(field)) = (self.price, schema.get_field(fields::PRICE)) {
            doc.add_f64(field, price);
        }

        doc
    }

    fn document_id(&self) -> String {
        self.id.clone()
    }
}

/// Build the product index schema
pub fn build_product_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    schema_builder.add_text_field(fields::ID, STRING | STORED);

    // Full-text fields, default analyzer with positions
    schema_builder.add_text_field(fields::NAME, TEXT);
    schema_builder.add_text_field(fields::BRAND, TEXT);
    schema_builder.add_text_field(fields::DESCRIPTION, TEXT);

    let shingles = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(SHINGLE_ANALYZER)
            .set_index_option(IndexRecordOption::WithFreqs),
    );
    schema_builder.add_text_field(fields::NAME_SHINGLES, shingles.clone());
    schema_builder.add_text_field(fields::BRAND_SHINGLES, shingles);

    // Keyword fields for filters and terms facets
    schema_builder.add_text_field(fields::BRAND_EXACT, STRING | FAST);
    schema_builder.add_text_field(fields::COLOR, STRING | FAST);
    schema_builder.add_text_field(fields::SIZE, STRING | FAST);
    schema_builder.add_text_field(fields::CATEGORY, STRING | FAST);

    schema_builder.add_f64_field(fields::PRICE, INDEXED | FAST);

    schema_builder.add_text_field(fields::SOURCE, STORED);

    schema_builder.build()
}
