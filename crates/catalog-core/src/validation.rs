//! # Validation Module
//!
//! Turns loosely-typed remote payloads and user-typed edit values into
//! checked values the store can write.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: JSON decode (payload.rs)                                     │
//! │  └── Lenient: any numeric shape accepted, only `id` required           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── normalize_payload: prices, stock, categories                      │
//! │  └── parse_field_value: manual edits                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(remote_id)                                                 │
//! │  └── CHECK (>= 0) on prices and stock                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Absent Is Not Zero
//! A missing, `null` or empty-string price or stock value normalizes to
//! `None`. An explicit `0` stays `0`.

use crate::error::ValidationError;
use crate::money::Money;
use crate::payload::{CategoryRef, ProductPayload, RawNumber};
use crate::types::{FieldValue, ProductChanges, ProductField};
use crate::CATEGORY_SEPARATOR;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Payload Normalization
// =============================================================================

/// Normalizes a remote payload into the field set written by an upsert.
///
/// ## Rules
/// - `name`: missing or null becomes the empty string
/// - `sku`: kept as sent; an empty string is stored as `None`
/// - `regular_price` / `sale_price`: absent, null or `""` → `None`;
///   extra fractional digits round to cents; non-numeric or negative → error
/// - `stock_quantity`: absent, null or `""` → `None`;
///   non-integer or negative → error
/// - `categories`: non-empty list → names joined with `", "`, else `None`
///
/// ## Example
/// ```rust
/// use catalog_core::payload::ProductPayload;
/// use catalog_core::validation::normalize_payload;
///
/// let payload = ProductPayload::new(1, "Tea")
///     .with_regular_price("4.5")
///     .with_stock(0i64)
///     .with_categories(["A", "B"]);
///
/// let changes = normalize_payload(&payload).unwrap();
/// assert_eq!(changes.regular_price.unwrap().cents(), 450);
/// assert_eq!(changes.stock_quantity, Some(0));
/// assert_eq!(changes.categories.as_deref(), Some("A, B"));
///
/// let bad = ProductPayload::new(2, "Tea").with_regular_price("abc");
/// assert!(normalize_payload(&bad).is_err());
/// ```
pub fn normalize_payload(payload: &ProductPayload) -> ValidationResult<ProductChanges> {
    let regular_price = parse_price("regular_price", payload.regular_price.as_ref())?;
    let sale_price = parse_price("sale_price", payload.sale_price.as_ref())?;
    let stock_quantity = parse_stock("stock_quantity", payload.stock_quantity.as_ref())?;

    Ok(ProductChanges {
        remote_id: payload.id,
        name: payload.name.clone().unwrap_or_default(),
        sku: payload.sku.clone().filter(|s| !s.trim().is_empty()),
        regular_price,
        sale_price,
        stock_quantity,
        categories: join_categories(payload.categories.as_deref()),
    })
}

/// Flattens a category list into one display string.
///
/// Returns `None` for a missing list, an empty list, or a list whose
/// entries are all unnamed.
pub fn join_categories(categories: Option<&[CategoryRef]>) -> Option<String> {
    let names: Vec<&str> = categories?
        .iter()
        .map(|c| c.name.trim())
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(CATEGORY_SEPARATOR))
    }
}

// =============================================================================
// Numeric Fields
// =============================================================================

/// Parses an optional non-negative price.
pub fn parse_price(field: &str, raw: Option<&RawNumber>) -> ValidationResult<Option<Money>> {
    let raw = match raw {
        None => return Ok(None),
        Some(r) if r.is_blank() => return Ok(None),
        Some(r) => r,
    };

    let money = match raw {
        RawNumber::Int(n) => n
            .checked_mul(100)
            .map(Money::from_cents)
            .ok_or_else(|| invalid(field, "amount is too large"))?,
        // f64 Display never uses exponent notation, so this goes through
        // the same decimal rules as text input.
        RawNumber::Float(f) => parse_money_text(field, &f.to_string())?,
        RawNumber::Text(s) => parse_money_text(field, s)?,
        RawNumber::Other(v) => return Err(invalid(field, &format!("unexpected value {v}"))),
    };

    if money.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(Some(money))
}

/// Parses an optional non-negative integer quantity.
pub fn parse_stock(field: &str, raw: Option<&RawNumber>) -> ValidationResult<Option<i64>> {
    let raw = match raw {
        None => return Ok(None),
        Some(r) if r.is_blank() => return Ok(None),
        Some(r) => r,
    };

    let qty = match raw {
        RawNumber::Int(n) => *n,
        RawNumber::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => *f as i64,
        RawNumber::Float(f) => return Err(invalid(field, &format!("{f} is not an integer"))),
        RawNumber::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(field, &format!("'{}' is not an integer", s.trim())))?,
        RawNumber::Other(v) => return Err(invalid(field, &format!("unexpected value {v}"))),
    };

    if qty < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(Some(qty))
}

fn parse_money_text(field: &str, text: &str) -> ValidationResult<Money> {
    Money::parse(text).map_err(|e| invalid(field, &e.to_string()))
}

fn invalid(field: &str, reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Manual Edits
// =============================================================================

/// Parses user-typed text for a locally edited field.
///
/// ## Rules
/// - Prices: empty text clears the price (`None`)
/// - Stock: empty text sets the quantity to `0`
/// - Otherwise the same rules as [`normalize_payload`]
///
/// ## Example
/// ```rust
/// use catalog_core::types::{FieldValue, ProductField};
/// use catalog_core::validation::parse_field_value;
///
/// let v = parse_field_value(ProductField::SalePrice, "").unwrap();
/// assert_eq!(v, FieldValue::Price(None));
///
/// let v = parse_field_value(ProductField::StockQuantity, "").unwrap();
/// assert_eq!(v, FieldValue::Stock(Some(0)));
/// ```
pub fn parse_field_value(field: ProductField, text: &str) -> ValidationResult<FieldValue> {
    let raw = RawNumber::Text(text.to_string());

    match field {
        ProductField::RegularPrice | ProductField::SalePrice => {
            parse_price(field.as_str(), Some(&raw)).map(FieldValue::Price)
        }
        ProductField::StockQuantity => {
            if raw.is_blank() {
                return Ok(FieldValue::Stock(Some(0)));
            }
            parse_stock(field.as_str(), Some(&raw)).map(FieldValue::Stock)
        }
    }
}

// =============================================================================
// Paging
// =============================================================================

/// Number of pages needed to show `count` rows, `per_page` at a time.
///
/// ## Example
/// ```rust
/// use catalog_core::validation::total_pages;
///
/// assert_eq!(total_pages(0, 50), 0);
/// assert_eq!(total_pages(50, 50), 1);
/// assert_eq!(total_pages(51, 50), 2);
/// ```
pub fn total_pages(count: i64, per_page: i64) -> i64 {
    if count <= 0 || per_page <= 0 {
        return 0;
    }
    (count + per_page - 1) / per_page
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> ProductPayload {
        ProductPayload::new(10, "Blue Mug")
            .with_sku("MUG-1")
            .with_regular_price("12.50")
            .with_sale_price("9.99")
            .with_stock(4i64)
            .with_categories(["Kitchen", "Gifts"])
    }

    #[test]
    fn test_normalize_full_payload() {
        let changes = normalize_payload(&full_payload()).unwrap();
        assert_eq!(changes.remote_id, 10);
        assert_eq!(changes.name, "Blue Mug");
        assert_eq!(changes.sku.as_deref(), Some("MUG-1"));
        assert_eq!(changes.regular_price, Some(Money::from_cents(1250)));
        assert_eq!(changes.sale_price, Some(Money::from_cents(999)));
        assert_eq!(changes.stock_quantity, Some(4));
        assert_eq!(changes.categories.as_deref(), Some("Kitchen, Gifts"));
    }

    #[test]
    fn test_absent_values_are_none_not_zero() {
        let payload = ProductPayload::new(1, "Bare");
        let changes = normalize_payload(&payload).unwrap();
        assert_eq!(changes.regular_price, None);
        assert_eq!(changes.sale_price, None);
        assert_eq!(changes.stock_quantity, None);
        assert_eq!(changes.categories, None);

        let blank = ProductPayload::new(1, "Blank")
            .with_regular_price("")
            .with_sale_price("  ")
            .with_stock("");
        let changes = normalize_payload(&blank).unwrap();
        assert_eq!(changes.regular_price, None);
        assert_eq!(changes.sale_price, None);
        assert_eq!(changes.stock_quantity, None);
    }

    #[test]
    fn test_explicit_zero_is_kept() {
        let payload = ProductPayload::new(1, "Free")
            .with_regular_price("0")
            .with_stock(0i64);
        let changes = normalize_payload(&payload).unwrap();
        assert_eq!(changes.regular_price, Some(Money::zero()));
        assert_eq!(changes.stock_quantity, Some(0));
    }

    #[test]
    fn test_numeric_shapes() {
        let mut payload = ProductPayload::new(1, "Shapes").with_regular_price(12i64);
        payload.sale_price = Some(RawNumber::Float(3.5));
        payload.stock_quantity = Some(RawNumber::Text(" 7 ".into()));

        let changes = normalize_payload(&payload).unwrap();
        assert_eq!(changes.regular_price, Some(Money::from_cents(1200)));
        assert_eq!(changes.sale_price, Some(Money::from_cents(350)));
        assert_eq!(changes.stock_quantity, Some(7));

        payload.stock_quantity = Some(RawNumber::Float(3.0));
        assert_eq!(normalize_payload(&payload).unwrap().stock_quantity, Some(3));
    }

    #[test]
    fn test_extra_price_precision_rounds_to_cents() {
        let mut payload = ProductPayload::new(1, "Pre-tax").with_regular_price("16.8067");
        payload.sale_price = Some(RawNumber::Float(12.3449));

        let changes = normalize_payload(&payload).unwrap();
        assert_eq!(changes.regular_price, Some(Money::from_cents(1681)));
        assert_eq!(changes.sale_price, Some(Money::from_cents(1234)));
    }

    #[test]
    fn test_rejects_bad_prices() {
        let bad = ProductPayload::new(1, "Bad").with_regular_price("abc");
        assert!(matches!(
            normalize_payload(&bad),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "regular_price"
        ));

        let negative = ProductPayload::new(1, "Neg").with_sale_price("-1.00");
        assert_eq!(
            normalize_payload(&negative),
            Err(ValidationError::Negative {
                field: "sale_price".into()
            })
        );


        let mut odd = ProductPayload::new(1, "Odd");
        odd.regular_price = Some(RawNumber::Other(serde_json::Value::Bool(true)));
        assert!(normalize_payload(&odd).is_err());
    }

    #[test]
    fn test_rejects_bad_stock() {
        let text = ProductPayload::new(1, "x").with_stock("many");
        assert!(normalize_payload(&text).is_err());

        let negative = ProductPayload::new(1, "x").with_stock(-3i64);
        assert!(matches!(
            normalize_payload(&negative),
            Err(ValidationError::Negative { .. })
        ));

        let mut fractional = ProductPayload::new(1, "x");
        fractional.stock_quantity = Some(RawNumber::Float(2.5));
        assert!(normalize_payload(&fractional).is_err());
    }

    #[test]
    fn test_categories() {
        assert_eq!(join_categories(None), None);
        assert_eq!(join_categories(Some(&[][..])), None);

        let cats = vec![
            CategoryRef { name: "A".into() },
            CategoryRef { name: "B".into() },
        ];
        assert_eq!(join_categories(Some(cats.as_slice())).as_deref(), Some("A, B"));

        let unnamed = vec![CategoryRef { name: "".into() }];
        assert_eq!(join_categories(Some(unnamed.as_slice())), None);
    }

    #[test]
    fn test_missing_name_and_blank_sku() {
        let mut payload = ProductPayload::new(5, "").with_sku("");
        payload.name = None;
        let changes = normalize_payload(&payload).unwrap();
        assert_eq!(changes.name, "");
        assert_eq!(changes.sku, None);
    }

    #[test]
    fn test_parse_field_value() {
        assert_eq!(
            parse_field_value(ProductField::RegularPrice, "19.9").unwrap(),
            FieldValue::Price(Some(Money::from_cents(1990)))
        );
        assert_eq!(
            parse_field_value(ProductField::RegularPrice, "").unwrap(),
            FieldValue::Price(None)
        );
        assert_eq!(
            parse_field_value(ProductField::StockQuantity, "12").unwrap(),
            FieldValue::Stock(Some(12))
        );
        assert_eq!(
            parse_field_value(ProductField::StockQuantity, " ").unwrap(),
            FieldValue::Stock(Some(0))
        );
        assert!(parse_field_value(ProductField::StockQuantity, "1.5").is_err());
        assert!(parse_field_value(ProductField::SalePrice, "-2").is_err());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 50), 0);
        assert_eq!(total_pages(1, 50), 1);
        assert_eq!(total_pages(100, 50), 2);
        assert_eq!(total_pages(125, 50), 3);
        assert_eq!(total_pages(10, 0), 0);
    }
}
