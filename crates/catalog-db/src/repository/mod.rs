//! # Repository Module
//!
//! Database repository implementations for the record store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories and Their Keys                          │
//! │                                                                         │
//! │  Sync pipeline / service                                               │
//! │       │                                                                 │
//! │       │  db.products().upsert(&payload)                                │
//! │       ▼                                                                 │
//! │  ProductRepository            keyed by remote_id                       │
//! │  ├── upsert(&self, payload)                                            │
//! │  ├── get_by_id / get_by_remote_id                                      │
//! │  ├── search(&self, term, limit, offset)                                │
//! │  ├── count / count_matching                                            │
//! │  └── update_field / mark_synced                                        │
//! │                                                                         │
//! │  VendorRepository             vendors by name,                         │
//! │  ├── add / get_by_name / list  stock by (product_id, vendor_id)        │
//! │  └── upsert_stock / stocks_for_product                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Every write is its own transaction: acquire, work, commit or roll     │
//! │  back. A failed write never leaves partial fields behind.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod vendor;
