//! # catalog-sync: Remote Catalog Sync Engine
//!
//! Pulls a WooCommerce store's product catalog into the local record store
//! and pushes local price and stock edits back.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Catalog Sync Architecture                        │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 CatalogService (caller surface)                  │  │
//! │  │                                                                  │  │
//! │  │  start_full_sync → SyncHandle    sync_one / push_one            │  │
//! │  │  search / edit_field             test_connection                │  │
//! │  └───────────────┬───────────────────────────────┬──────────────────┘  │
//! │                  │                               │                      │
//! │                  ▼                               ▼                      │
//! │  ┌────────────────────────────┐   ┌─────────────────────────────────┐  │
//! │  │ FullSync (pipeline)        │   │ catalog-db Database             │  │
//! │  │                            │   │                                 │  │
//! │  │ producer ──queue──► consumer──►│ ProductStore::upsert_product   │  │
//! │  │    │                       │   │                                 │  │
//! │  │    ▼                       │   └─────────────────────────────────┘  │
//! │  │ RemoteCatalog (WooClient)  │                                        │
//! │  │ CancellationToken          │   ┌─────────────────────────────────┐  │
//! │  │ ProgressReporter ◄─────────┼───│ ProgressTracker / Tracing /     │  │
//! │  └────────────────────────────┘   │ Silent reporters                │  │
//! │                                   └─────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - TOML + environment configuration
//! - [`client`] - `RemoteCatalog` trait and the WooCommerce REST client
//! - [`store`] - `ProductStore` seam over the record store
//! - [`progress`] - Progress reporting and cancel requests
//! - [`pipeline`] - Producer/consumer full sync
//! - [`service`] - Caller-facing operations
//! - [`error`] - Sync error types
//!
//! ## Usage
//! ```rust,ignore
//! use catalog_sync::{CatalogService, SyncConfig};
//!
//! let config = SyncConfig::load(None)?;
//! let service = CatalogService::from_config(&config).await?;
//!
//! let handle = service.start_full_sync().await?;
//! handle.on_progress(|p| println!("{}/{}", p.processed, p.total));
//! let report = handle.wait().await?;
//! println!("{}", report.message());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{Disconnected, PushFields, PushOutcome, RemoteCatalog, WooClient};
pub use config::SyncConfig;
pub use error::{SyncError, SyncResult};
pub use pipeline::{
    FullSync, PipelineSettings, ProducerStop, RecordError, SyncOutcome, SyncReport,
};
pub use progress::{
    ProgressEvent, ProgressReporter, ProgressTracker, SilentReporter, TracingReporter,
};
pub use service::{CatalogService, EditOutcome, SearchPage, SyncCanceller, SyncHandle};
pub use store::ProductStore;
