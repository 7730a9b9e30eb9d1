//! # catalog-core: Pure Catalog Logic
//!
//! Domain types and payload rules shared by the database layer, the sync
//! pipeline and the command-line front end. Nothing in here performs I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Catalog Sync Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    catalog-cli (front end)                      │   │
//! │  │      sync ──► pull ──► push ──► search ──► edit                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           catalog-sync (client, pipeline, service)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                catalog-db (SQLite record store)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ catalog-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  payload  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ RawNumber │  │ normalize │  │   │
//! │  │   │  Vendor   │  │  parsing  │  │ Category  │  │ edit text │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Row types (Product, Vendor, VendorStock) and edit types
//! - [`money`] - Money type in integer cents
//! - [`payload`] - The remote product record as decoded from the API
//! - [`validation`] - Payload normalization and edit value parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use catalog_core::payload::ProductPayload;
//! use catalog_core::validation::normalize_payload;
//!
//! let payload: ProductPayload = serde_json::from_str(
//!     r#"{"id": 7, "name": "Mug", "regular_price": "12.50", "categories": [{"name": "Kitchen"}]}"#,
//! ).unwrap();
//!
//! let changes = normalize_payload(&payload).unwrap();
//! assert_eq!(changes.regular_price.map(|m| m.cents()), Some(1250));
//! assert_eq!(changes.sale_price, None);
//! assert_eq!(changes.categories.as_deref(), Some("Kitchen"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod payload;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, MoneyParseError, ValidationError};
pub use money::Money;
pub use payload::{CategoryRef, ProductPayload, RawNumber};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Separator used when flattening a category list into one display string.
pub const CATEGORY_SEPARATOR: &str = ", ";

/// Rows per page for catalog search results.
pub const SEARCH_PAGE_SIZE: i64 = 50;
