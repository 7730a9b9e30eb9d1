//! # Domain Types
//!
//! Row types stored by the record store, plus the typed forms of a sync
//! write and of a manual edit.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  VendorStock    │   │     Vendor      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (local)     │◄──│  product_id     │   │  id (local)     │       │
//! │  │  remote_id (UQ) │   │  vendor_id      │──►│  name (UQ)      │       │
//! │  │  name, sku      │   │  stock_quantity │   │  api_url/key    │       │
//! │  │  prices (cents) │   │  price_cents    │   │  is_active      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ ProductChanges  │   │  ProductField   │   │   FieldValue    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  normalized     │   │  RegularPrice   │   │  Price(Option)  │       │
//! │  │  payload fields │   │  SalePrice      │   │  Stock(Option)  │       │
//! │  └─────────────────┘   │  StockQuantity  │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! A product has a local `id` (row identity, referenced by vendor stock) and
//! a `remote_id` (the store's identifier, the key every sync upserts on).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product row.
///
/// `None` prices and stock mean "not set on the remote", which is distinct
/// from zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub remote_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub regular_price_cents: Option<i64>,
    pub sale_price_cents: Option<i64>,
    pub stock_quantity: Option<i64>,
    /// Category names joined with `", "`.
    pub categories: Option<String>,
    /// Local wall-clock time of the last sync or edit.
    pub last_synced: NaiveDateTime,
}

impl Product {
    pub fn regular_price(&self) -> Option<Money> {
        self.regular_price_cents.map(Money::from_cents)
    }

    pub fn sale_price(&self) -> Option<Money> {
        self.sale_price_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Vendor
// =============================================================================

/// A named external stock source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub api_url: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    pub is_active: bool,
    pub last_sync: Option<NaiveDateTime>,
}

// =============================================================================
// Vendor Stock
// =============================================================================

/// Stock a vendor reports for one product. One row per (product, vendor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct VendorStock {
    pub id: i64,
    pub product_id: i64,
    pub vendor_id: i64,
    pub stock_quantity: i64,
    pub price_cents: Option<i64>,
    pub last_updated: NaiveDateTime,
}

impl VendorStock {
    pub fn price(&self) -> Option<Money> {
        self.price_cents.map(Money::from_cents)
    }
}

// =============================================================================
// Product Changes
// =============================================================================

/// The mutable fields of a product after normalization.
///
/// Produced by [`normalize_payload`](crate::validation::normalize_payload);
/// every field overwrites the stored value, including `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductChanges {
    pub remote_id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub regular_price: Option<Money>,
    pub sale_price: Option<Money>,
    pub stock_quantity: Option<i64>,
    pub categories: Option<String>,
}

// =============================================================================
// Editable Fields
// =============================================================================

/// Fields that can be edited locally and pushed back to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductField {
    RegularPrice,
    SalePrice,
    StockQuantity,
}

impl ProductField {
    pub const ALL: [ProductField; 3] = [
        ProductField::RegularPrice,
        ProductField::SalePrice,
        ProductField::StockQuantity,
    ];

    /// Name used by the remote API and on the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ProductField::RegularPrice => "regular_price",
            ProductField::SalePrice => "sale_price",
            ProductField::StockQuantity => "stock_quantity",
        }
    }

    /// Column holding this field in the `products` table.
    pub const fn column(&self) -> &'static str {
        match self {
            ProductField::RegularPrice => "regular_price_cents",
            ProductField::SalePrice => "sale_price_cents",
            ProductField::StockQuantity => "stock_quantity",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductField::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "field".to_string(),
                allowed: ProductField::ALL
                    .iter()
                    .map(|f| f.as_str().to_string())
                    .collect(),
            })
    }
}

/// A parsed value for one [`ProductField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Price(Option<Money>),
    Stock(Option<i64>),
}

impl FieldValue {
    /// The value as stored in the database column.
    pub fn as_column_value(&self) -> Option<i64> {
        match self {
            FieldValue::Price(p) => p.map(|m| m.cents()),
            FieldValue::Stock(s) => *s,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_field_parse() {
        assert_eq!(
            "regular_price".parse::<ProductField>().unwrap(),
            ProductField::RegularPrice
        );
        assert_eq!(
            " stock_quantity ".parse::<ProductField>().unwrap(),
            ProductField::StockQuantity
        );
        let err = "name".parse::<ProductField>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_product_field_columns() {
        assert_eq!(ProductField::SalePrice.column(), "sale_price_cents");
        assert_eq!(ProductField::StockQuantity.column(), "stock_quantity");
        assert_eq!(ProductField::RegularPrice.to_string(), "regular_price");
    }

    #[test]
    fn test_field_value_column_value() {
        assert_eq!(
            FieldValue::Price(Some(Money::from_cents(250))).as_column_value(),
            Some(250)
        );
        assert_eq!(FieldValue::Price(None).as_column_value(), None);
        assert_eq!(FieldValue::Stock(Some(0)).as_column_value(), Some(0));
    }

    #[test]
    fn test_vendor_secret_not_serialized() {
        let vendor = Vendor {
            id: 1,
            name: "Acme".into(),
            api_url: "https://acme.example".into(),
            api_key: "ck".into(),
            api_secret: "cs".into(),
            is_active: true,
            last_sync: None,
        };
        let json = serde_json::to_string(&vendor).unwrap();
        assert!(!json.contains("api_secret"));
    }
}
