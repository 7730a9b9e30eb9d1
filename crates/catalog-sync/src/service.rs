//! # Catalog Service
//!
//! The operations a front end calls. Owns the remote client and the record
//! store and hands out [`SyncHandle`]s for background full syncs.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       CatalogService Surface                            │
//! │                                                                         │
//! │  start_full_sync() ──► SyncHandle                                      │
//! │                         ├── cancel()                                   │
//! │                         ├── on_progress(cb)                            │
//! │                         ├── on_complete(cb)                            │
//! │                         └── wait() ──► SyncReport                      │
//! │                                                                         │
//! │  sync_one(remote_id)   remote ──► local   (one record)                 │
//! │  push_one(remote_id)   local  ──► remote  (prices + stock)             │
//! │  search(term, page)    local read, 50 rows per page                    │
//! │  edit_field(id, f, v)  local single-field update                       │
//! │  test_connection()     authenticated remote ping                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only one full sync runs per service at a time. Single-record operations
//! may run alongside it; each is its own transaction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::{Disconnected, PushFields, PushOutcome, RemoteCatalog, WooClient};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::pipeline::{FullSync, PipelineSettings, SyncReport};
use crate::progress::{ProgressEvent, ProgressReporter, ProgressTracker};
use catalog_core::validation::{parse_field_value, total_pages};
use catalog_core::{Product, ProductField, SEARCH_PAGE_SIZE};
use catalog_db::{Database, DbConfig};

// =============================================================================
// Result Types
// =============================================================================

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub rows: Vec<Product>,
    /// 1-based page these rows belong to.
    pub page: u32,
    pub total_pages: i64,
    pub total_rows: i64,
}

/// Result of a manual field edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Updated,
    NotFound,
}

// =============================================================================
// Sync Handle
// =============================================================================

/// A full sync running in the background.
#[derive(Debug)]
pub struct SyncHandle {
    tracker: Arc<ProgressTracker>,
    task: JoinHandle<SyncResult<SyncReport>>,
}

impl SyncHandle {
    /// Asks the sync to stop. Returns immediately; the run ends with
    /// `cancelled: N processed` shortly after.
    pub fn cancel(&self) {
        self.tracker.request_cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.tracker.is_cancelled()
    }

    /// Registers a callback for periodic progress.
    pub fn on_progress<F>(&self, callback: F)
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.tracker.on_progress(callback);
    }

    /// Registers a callback for the final report.
    ///
    /// Fires immediately if the sync has already finished.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce(&SyncReport) + Send + 'static,
    {
        self.tracker.on_complete(callback);
    }

    /// A cloneable cancel capability that outlives `wait()`.
    pub fn canceller(&self) -> SyncCanceller {
        SyncCanceller(Arc::clone(&self.tracker))
    }

    /// Latest progress snapshot.
    pub fn progress(&self) -> ProgressEvent {
        self.tracker.snapshot()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the sync to end.
    pub async fn wait(self) -> SyncResult<SyncReport> {
        self.task.await?
    }
}

/// Cancels a running sync from another task, e.g. a Ctrl-C handler.
#[derive(Debug, Clone)]
pub struct SyncCanceller(Arc<ProgressTracker>);

impl SyncCanceller {
    pub fn cancel(&self) {
        self.0.request_cancel();
    }
}

/// Clears the running flag however the sync task exits.
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// Catalog Service
// =============================================================================

/// Caller-facing catalog operations.
#[derive(Clone)]
pub struct CatalogService<C> {
    remote: C,
    db: Database,
    settings: PipelineSettings,
    running: Arc<AtomicBool>,
}

impl CatalogService<WooClient> {
    /// Opens the database and builds the WooCommerce client from config.
    ///
    /// Fails with a config error when credentials are missing, or a
    /// database error when the store cannot be opened.
    pub async fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        let remote = WooClient::from_settings(&config.store, config.sync.request_timeout())?;
        let db = Database::new(DbConfig::new(&config.database.path)).await?;
        Ok(Self::new(remote, db, config.sync.pipeline_settings()))
    }
}

impl CatalogService<Disconnected> {
    /// Opens only the local database. Remote operations fail with
    /// [`SyncError::MissingCredential`].
    pub async fn open_local(config: &SyncConfig) -> SyncResult<Self> {
        let db = Database::new(DbConfig::new(&config.database.path)).await?;
        Ok(Self::new(Disconnected, db, config.sync.pipeline_settings()))
    }
}

impl<C: RemoteCatalog> CatalogService<C> {
    pub fn new(remote: C, db: Database, settings: PipelineSettings) -> Self {
        CatalogService {
            remote,
            db,
            settings,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The underlying record store.
    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn remote(&self) -> &C {
        &self.remote
    }

    /// True while a full sync started by this service is running.
    pub fn is_syncing(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts a full sync in the background.
    ///
    /// The remote total is fetched before anything is spawned, so an
    /// unreachable remote fails here rather than inside the handle.
    ///
    /// ## Returns
    /// * `Ok(SyncHandle)` - Sync is running
    /// * `Err(SyncError::AlreadyRunning)` - Another full sync is in progress
    /// * `Err(_)` - Remote total could not be fetched
    pub async fn start_full_sync(&self) -> SyncResult<SyncHandle> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SyncError::AlreadyRunning);
        }
        let guard = RunGuard(Arc::clone(&self.running));

        let sync = FullSync::new(self.remote.clone(), self.db.clone(), self.settings.clone());
        let total = sync.fetch_total().await?;

        let tracker = Arc::new(ProgressTracker::new(total));
        let reporter = Arc::clone(&tracker);

        let task = tokio::spawn(async move {
            let _guard = guard;
            sync.run_with_total(total, reporter.as_ref()).await
        });

        Ok(SyncHandle { tracker, task })
    }

    /// Re-fetches one product from the remote and upserts it.
    ///
    /// ## Returns
    /// Local id of the stored row.
    pub async fn sync_one(&self, remote_id: i64) -> SyncResult<i64> {
        let payload = self.remote.fetch_product(remote_id).await?;
        let local_id = self.db.products().upsert(&payload).await?;
        info!(remote_id, local_id, "Product synced from remote");
        Ok(local_id)
    }

    /// Pushes a locally stored product's prices and stock to the remote.
    ///
    /// On success the row's `last_synced` is refreshed. A rejected push is
    /// returned as `success = false` with the remote's status.
    ///
    /// ## Returns
    /// * `Ok(PushOutcome)` - Remote answered
    /// * `Err(SyncError::ProductNotFound)` - No local row for `remote_id`
    pub async fn push_one(&self, remote_id: i64) -> SyncResult<PushOutcome> {
        let product = self
            .db
            .products()
            .get_by_remote_id(remote_id)
            .await?
            .ok_or(SyncError::ProductNotFound(remote_id))?;

        let fields = PushFields::from(&product);
        let outcome = self.remote.push_product(remote_id, &fields).await?;

        if outcome.success {
            self.db.products().mark_synced(remote_id).await?;
        } else {
            warn!(remote_id, status = outcome.status, "Push failed");
        }
        Ok(outcome)
    }

    /// Case-insensitive search on name or SKU, 50 rows per page.
    ///
    /// `page` is 1-based; 0 is treated as 1. A page past the end returns no
    /// rows with the correct `total_pages`.
    pub async fn search(&self, term: &str, page: u32) -> SyncResult<SearchPage> {
        let page = page.max(1);
        let offset = i64::from(page - 1) * SEARCH_PAGE_SIZE;

        let products = self.db.products();
        let total_rows = products.count_matching(term).await?;
        let rows = products.search(term, SEARCH_PAGE_SIZE, offset).await?;

        Ok(SearchPage {
            rows,
            page,
            total_pages: total_pages(total_rows, SEARCH_PAGE_SIZE),
            total_rows,
        })
    }

    /// Applies a manual edit to one field of a local product.
    ///
    /// `text` is parsed for the field: a blank price clears it, a blank
    /// stock sets it to 0.
    ///
    /// ## Returns
    /// * `Ok(EditOutcome::NotFound)` - No local row for `remote_id`
    /// * `Err(SyncError::InvalidValue)` - `text` does not parse for `field`
    pub async fn edit_field(
        &self,
        remote_id: i64,
        field: ProductField,
        text: &str,
    ) -> SyncResult<EditOutcome> {
        let value = parse_field_value(field, text)?;
        let updated = self
            .db
            .products()
            .update_field(remote_id, field, value)
            .await?;

        if updated {
            info!(remote_id, field = %field, "Field updated");
            Ok(EditOutcome::Updated)
        } else {
            Ok(EditOutcome::NotFound)
        }
    }

    /// Verifies the remote is reachable and accepts the credentials.
    pub async fn test_connection(&self) -> SyncResult<()> {
        self.remote.ping().await?;
        info!("Remote connection OK");
        Ok(())
    }
}
