//! # Remote Payload
//!
//! The product record as the store's REST API returns it.
//!
//! Numeric fields arrive in whatever shape the remote happens to use:
//! prices are usually strings (`"19.90"`, `""`), stock is usually an integer
//! or `null`, and older plugins send floats. Decoding is deliberately lenient
//! so a single malformed record never fails the decode of the whole page it
//! arrived in; strict checks happen later in
//! [`normalize_payload`](crate::validation::normalize_payload).
//!
//! ```text
//! GET /products?page=3 ──► [ {..}, {..}, {"regular_price": "abc"}, .. ]
//!                                         │
//!                          decode: OK (RawNumber::Text("abc"))
//!                                         │
//!                          normalize: ValidationError ──► that record only
//! ```

use serde::{Deserialize, Serialize};

// =============================================================================
// Raw Number
// =============================================================================

/// A numeric field exactly as the remote sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
    /// Anything else (booleans, objects, arrays). Always rejected on normalize.
    Other(serde_json::Value),
}

impl RawNumber {
    /// True for the empty string, which the remote uses for "not set".
    pub fn is_blank(&self) -> bool {
        matches!(self, RawNumber::Text(s) if s.trim().is_empty())
    }
}

impl From<&str> for RawNumber {
    fn from(s: &str) -> Self {
        RawNumber::Text(s.to_string())
    }
}

impl From<i64> for RawNumber {
    fn from(n: i64) -> Self {
        RawNumber::Int(n)
    }
}

// =============================================================================
// Category Reference
// =============================================================================

/// One entry of a product's `categories` list. Only the name is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    #[serde(default)]
    pub name: String,
}

// =============================================================================
// Product Payload
// =============================================================================

/// A product object from `GET /products` or `GET /products/{id}`.
///
/// Unknown fields are ignored. Only `id` is required: a record without an
/// identity cannot be keyed and does fail decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPayload {
    /// Remote catalog identifier.
    pub id: i64,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub regular_price: Option<RawNumber>,

    #[serde(default)]
    pub sale_price: Option<RawNumber>,

    #[serde(default)]
    pub stock_quantity: Option<RawNumber>,

    #[serde(default)]
    pub categories: Option<Vec<CategoryRef>>,
}

impl ProductPayload {
    /// A payload carrying only an identity and a name.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            sku: None,
            regular_price: None,
            sale_price: None,
            stock_quantity: None,
            categories: None,
        }
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    pub fn with_regular_price(mut self, price: impl Into<RawNumber>) -> Self {
        self.regular_price = Some(price.into());
        self
    }

    pub fn with_sale_price(mut self, price: impl Into<RawNumber>) -> Self {
        self.sale_price = Some(price.into());
        self
    }

    pub fn with_stock(mut self, stock: impl Into<RawNumber>) -> Self {
        self.stock_quantity = Some(stock.into());
        self
    }

    pub fn with_categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(
            names
                .into_iter()
                .map(|n| CategoryRef { name: n.into() })
                .collect(),
        );
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
