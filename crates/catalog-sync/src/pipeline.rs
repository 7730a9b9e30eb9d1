//! # Full Sync Pipeline
//!
//! Streams the whole remote catalog into the local store.
//!
//! ## Task Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         FullSync::run_with_total                        │
//! │                                                                         │
//! │   ┌──────────────┐   bounded mpsc (queue_capacity)   ┌──────────────┐  │
//! │   │  PRODUCER    │   ┌──┬──┬──┬──┬──┬──┬──┬──┐       │  CONSUMER    │  │
//! │   │              │──►│R │R │R │R │R │..│R │E │──────►│              │  │
//! │   │ fetch_page(1)│   └──┴──┴──┴──┴──┴──┴──┴──┘       │ upsert each  │  │
//! │   │ fetch_page(2)│    R = Record   E = End           │ record, one  │  │
//! │   │ ...          │                                   │ transaction  │  │
//! │   └──────┬───────┘                                   └──────┬───────┘  │
//! │          │            CancellationToken (shared)            │          │
//! │          └──────────────────────┬───────────────────────────┘          │
//! │                                 │                                       │
//! │                  ┌──────────────┴──────────────┐                       │
//! │                  │     SUPERVISING LOOP        │                       │
//! │                  │  every progress_interval:   │                       │
//! │                  │  - reporter cancelled?      │                       │
//! │                  │      → token.cancel()       │                       │
//! │                  │  - report(processed, total) │                       │
//! │                  │  - both tasks finished?     │                       │
//! │                  │      → join, final report   │                       │
//! │                  └─────────────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Termination
//! The producer stops on an empty page, a short page, a fetch error, or
//! cancellation. In every case except cancellation it enqueues `End` so the
//! consumer drains what is queued and stops. Cancellation stops both sides
//! at their next wait; an upsert already in flight is allowed to finish.
//!
//! ## Per-Record Failures
//! A record the store rejects is logged, collected in
//! [`SyncReport::record_errors`], and still counted as processed.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::client::RemoteCatalog;
use crate::error::SyncResult;
use crate::progress::ProgressReporter;
use crate::store::ProductStore;
use catalog_core::ProductPayload;

// =============================================================================
// Settings
// =============================================================================

/// Floor for every pipeline wait; `interval` panics on zero and a zero
/// timeout would spin.
const MIN_WAIT: Duration = Duration::from_millis(1);

/// Pipeline tuning, usually built from [`crate::config::SyncSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Records requested per page.
    pub page_size: u32,
    /// Bounded queue capacity.
    pub queue_capacity: usize,
    /// Consumer wait on an empty queue before re-checking cancellation.
    pub dequeue_timeout: Duration,
    /// Producer wait on a full queue before re-checking cancellation.
    pub enqueue_poll: Duration,
    /// Supervising loop period.
    pub progress_interval: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            page_size: 50,
            queue_capacity: 100,
            dequeue_timeout: Duration::from_secs(5),
            enqueue_poll: Duration::from_millis(250),
            progress_interval: Duration::from_millis(100),
        }
    }
}

// =============================================================================
// Queue and Report Types
// =============================================================================

/// What travels through the queue.
#[derive(Debug)]
pub enum QueueItem {
    Record(ProductPayload),
    End,
}

/// Why the producer stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum ProducerStop {
    /// Empty or short page: nothing more to fetch.
    Exhausted,
    /// A page fetch failed; the run ends with what was fetched so far.
    FetchFailed(String),
    /// Cancellation was requested.
    Cancelled,
}

/// Terminal state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    Completed,
    Cancelled,
}

/// A record the store refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordError {
    pub remote_id: i64,
    pub message: String,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Records taken off the queue, including ones the store rejected.
    pub processed: u64,
    /// Remote total reported before the run started.
    pub total: u64,
    pub outcome: SyncOutcome,
    pub producer_stop: ProducerStop,
    pub pages_fetched: u32,
    pub record_errors: Vec<RecordError>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncReport {
    /// `completed: N processed` or `cancelled: N processed`.
    pub fn message(&self) -> String {
        match self.outcome {
            SyncOutcome::Completed => format!("completed: {} processed", self.processed),
            SyncOutcome::Cancelled => format!("cancelled: {} processed", self.processed),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == SyncOutcome::Cancelled
    }

    /// Records stored successfully.
    pub fn stored(&self) -> u64 {
        self.processed
            .saturating_sub(self.record_errors.len() as u64)
    }
}

// =============================================================================
// Full Sync
// =============================================================================

/// One full pull of the remote catalog into a store.
pub struct FullSync<C, S> {
    remote: C,
    store: S,
    settings: PipelineSettings,
}

impl<C: RemoteCatalog, S: ProductStore> FullSync<C, S> {
    pub fn new(remote: C, store: S, settings: PipelineSettings) -> Self {
        FullSync {
            remote,
            store,
            settings,
        }
    }

    /// Asks the remote how many records to expect.
    ///
    /// Failure here is a setup error: nothing has been started yet.
    pub async fn fetch_total(&self) -> SyncResult<u64> {
        let total = self.remote.total_count().await?;
        info!(total, "Remote catalog size");
        Ok(total)
    }

    /// Fetches the total, then runs the pipeline.
    pub async fn run(&self, reporter: &dyn ProgressReporter) -> SyncResult<SyncReport> {
        let total = self.fetch_total().await?;
        self.run_with_total(total, reporter).await
    }

    /// Runs producer and consumer to completion or cancellation.
    ///
    /// ## Returns
    /// * `Ok(SyncReport)` - Completed or cancelled run, possibly partial
    /// * `Err(SyncError::TaskFailed)` - A pipeline task panicked
    pub async fn run_with_total(
        &self,
        total: u64,
        reporter: &dyn ProgressReporter,
    ) -> SyncResult<SyncReport> {
        let started = Instant::now();
        let settings = &self.settings;

        info!(
            total,
            page_size = settings.page_size,
            queue_capacity = settings.queue_capacity,
            "Starting full sync"
        );

        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let token = CancellationToken::new();
        let processed = Arc::new(AtomicU64::new(0));
        let pages = Arc::new(AtomicU32::new(0));

        let producer = tokio::spawn(produce(
            self.remote.clone(),
            tx,
            token.clone(),
            settings.page_size.max(1),
            settings.enqueue_poll.max(MIN_WAIT),
            Arc::clone(&pages),
        ));
        let consumer = tokio::spawn(consume(
            self.store.clone(),
            rx,
            token.clone(),
            settings.dequeue_timeout.max(MIN_WAIT),
            Arc::clone(&processed),
        ));

        let mut ticker = tokio::time::interval(settings.progress_interval.max(MIN_WAIT));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            // A cancel that arrives after both sides are done is too late
            let finished = producer.is_finished() && consumer.is_finished();

            if !finished && reporter.is_cancelled() && !token.is_cancelled() {
                info!("Cancelling full sync");
                token.cancel();
            }

            reporter.report(processed.load(Ordering::Relaxed), total, "syncing");

            if finished {
                break;
            }
        }

        let producer_stop = producer.await?;
        let record_errors = consumer.await?;

        let outcome = if token.is_cancelled() {
            SyncOutcome::Cancelled
        } else {
            SyncOutcome::Completed
        };

        let report = SyncReport {
            processed: processed.load(Ordering::SeqCst),
            total,
            outcome,
            producer_stop,
            pages_fetched: pages.load(Ordering::SeqCst),
            record_errors,
            elapsed: started.elapsed(),
        };

        info!(
            processed = report.processed,
            failed = report.record_errors.len(),
            pages = report.pages_fetched,
            stop = ?report.producer_stop,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "{}",
            report.message()
        );

        reporter.report(report.processed, total, &report.message());
        reporter.complete(&report);

        Ok(report)
    }
}

// =============================================================================
// Producer
// =============================================================================

async fn produce<C: RemoteCatalog>(
    remote: C,
    tx: mpsc::Sender<QueueItem>,
    token: CancellationToken,
    page_size: u32,
    enqueue_poll: Duration,
    pages: Arc<AtomicU32>,
) -> ProducerStop {
    let mut page = 1u32;

    let stop = 'pages: loop {
        if token.is_cancelled() {
            break ProducerStop::Cancelled;
        }

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = remote.fetch_page(page, page_size) => Some(result),
        };
        let Some(fetched) = fetched else {
            break ProducerStop::Cancelled;
        };

        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                warn!(page, error = %e, "Page fetch failed, stopping producer");
                break ProducerStop::FetchFailed(e.to_string());
            }
        };
        pages.fetch_add(1, Ordering::SeqCst);

        if records.is_empty() {
            debug!(page, "Empty page, remote catalog exhausted");
            break ProducerStop::Exhausted;
        }

        let last_page = records.len() < page_size as usize;
        trace!(page, count = records.len(), "Enqueueing page");

        for record in records {
            if !enqueue(&tx, QueueItem::Record(record), &token, enqueue_poll).await {
                break 'pages ProducerStop::Cancelled;
            }
        }

        if last_page {
            debug!(page, "Short page, remote catalog exhausted");
            break ProducerStop::Exhausted;
        }
        page += 1;
    };

    if stop != ProducerStop::Cancelled {
        enqueue(&tx, QueueItem::End, &token, enqueue_poll).await;
    }

    debug!(?stop, pages = pages.load(Ordering::SeqCst), "Producer finished");
    stop
}

/// Waits for queue space in bounded slices, re-checking cancellation
/// between them.
///
/// Returns false if the item was not enqueued.
async fn enqueue(
    tx: &mpsc::Sender<QueueItem>,
    item: QueueItem,
    token: &CancellationToken,
    poll: Duration,
) -> bool {
    loop {
        if token.is_cancelled() {
            return false;
        }

        match timeout(poll, tx.reserve()).await {
            Ok(Ok(permit)) => {
                permit.send(item);
                return true;
            }
            Ok(Err(_)) => {
                debug!("Queue closed by consumer");
                return false;
            }
            Err(_) => trace!("Queue full, waiting"),
        }
    }
}

// =============================================================================
// Consumer
// =============================================================================

async fn consume<S: ProductStore>(
    store: S,
    mut rx: mpsc::Receiver<QueueItem>,
    token: CancellationToken,
    dequeue_timeout: Duration,
    processed: Arc<AtomicU64>,
) -> Vec<RecordError> {
    let mut errors = Vec::new();

    loop {
        let received = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            received = timeout(dequeue_timeout, rx.recv()) => received,
        };

        let payload = match received {
            Err(_) => {
                trace!("Queue empty, waiting");
                continue;
            }
            Ok(None) => {
                debug!("Queue closed without end marker");
                break;
            }
            Ok(Some(QueueItem::End)) => break,
            Ok(Some(QueueItem::Record(payload))) => payload,
        };

        match store.upsert_product(&payload).await {
            Ok(local_id) => trace!(remote_id = payload.id, local_id, "Record stored"),
            Err(e) => {
                warn!(remote_id = payload.id, error = %e, "Record rejected");
                errors.push(RecordError {
                    remote_id: payload.id,
                    message: e.to_string(),
                });
            }
        }
        processed.fetch_add(1, Ordering::SeqCst);
    }

    debug!(
        processed = processed.load(Ordering::SeqCst),
        failed = errors.len(),
        "Consumer finished"
    );
    errors
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::client::{PushFields, PushOutcome};
    use crate::error::SyncError;
    use crate::progress::{ProgressTracker, SilentReporter};
    use catalog_db::{Database, DbConfig};
    use std::sync::Mutex;

    /// In-process remote catalog serving a fixed list of products.
    #[derive(Clone)]
    pub(crate) struct FakeCatalog {
        pub records: Arc<Vec<ProductPayload>>,
        pub fetches: Arc<AtomicU32>,
        pub fail_page: Option<u32>,
        pub fail_total: bool,
        pub pushed: Arc<Mutex<Vec<(i64, PushFields)>>>,
        pub push_status: u16,
    }

    impl FakeCatalog {
        pub fn with_records(records: Vec<ProductPayload>) -> Self {
            FakeCatalog {
                records: Arc::new(records),
                fetches: Arc::new(AtomicU32::new(0)),
                fail_page: None,
                fail_total: false,
                pushed: Arc::new(Mutex::new(Vec::new())),
                push_status: 200,
            }
        }

        pub fn numbered(count: i64) -> Self {
            Self::with_records(
                (1..=count)
                    .map(|id| ProductPayload::new(id, format!("Product {id}")))
                    .collect(),
            )
        }

        pub fn fetch_count(&self) -> u32 {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    impl RemoteCatalog for FakeCatalog {
        async fn total_count(&self) -> SyncResult<u64> {
            if self.fail_total {
                return Err(SyncError::Network("connection refused".into()));
            }
            Ok(self.records.len() as u64)
        }

        async fn fetch_page(&self, page: u32, per_page: u32) -> SyncResult<Vec<ProductPayload>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_page == Some(page) {
                return Err(SyncError::Http {
                    status: 500,
                    url: format!("fake://products?page={page}"),
                });
            }
            let start = ((page - 1) * per_page) as usize;
            let end = (start + per_page as usize).min(self.records.len());
            Ok(self
                .records
                .get(start..end)
                .map(|s| s.to_vec())
                .unwrap_or_default())
        }

        async fn fetch_product(&self, remote_id: i64) -> SyncResult<ProductPayload> {
            self.records
                .iter()
                .find(|p| p.id == remote_id)
                .cloned()
                .ok_or(SyncError::Http {
                    status: 404,
                    url: format!("fake://products/{remote_id}"),
                })
        }

        async fn push_product(
            &self,
            remote_id: i64,
            fields: &PushFields,
        ) -> SyncResult<PushOutcome> {
            self.pushed
                .lock()
                .unwrap()
                .push((remote_id, fields.clone()));
            Ok(PushOutcome {
                success: (200..300).contains(&self.push_status),
                status: self.push_status,
            })
        }

        async fn ping(&self) -> SyncResult<()> {
            if self.fail_total {
                return Err(SyncError::Network("connection refused".into()));
            }
            Ok(())
        }
    }

    /// Store that records upsert order and can be slowed down.
    #[derive(Clone)]
    struct RecordingStore {
        seen: Arc<Mutex<Vec<i64>>>,
        delay: Duration,
    }

    impl RecordingStore {
        fn new(delay: Duration) -> Self {
            RecordingStore {
                seen: Arc::new(Mutex::new(Vec::new())),
                delay,
            }
        }
    }

    impl ProductStore for RecordingStore {
        async fn upsert_product(&self, payload: &ProductPayload) -> SyncResult<i64> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let mut seen = self.seen.lock().unwrap();
            seen.push(payload.id);
            Ok(seen.len() as i64)
        }
    }

    fn fast_settings(page_size: u32) -> PipelineSettings {
        PipelineSettings {
            page_size,
            queue_capacity: 100,
            dequeue_timeout: Duration::from_millis(200),
            enqueue_poll: Duration::from_millis(20),
            progress_interval: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn test_full_sync_pages_and_count() {
        let remote = FakeCatalog::numbered(125);
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sync = FullSync::new(remote.clone(), db.clone(), fast_settings(50));

        let report = sync.run(&SilentReporter::default()).await.unwrap();

        assert_eq!(remote.fetch_count(), 3);
        assert_eq!(report.pages_fetched, 3);
        assert_eq!(report.total, 125);
        assert_eq!(report.processed, 125);
        assert_eq!(report.outcome, SyncOutcome::Completed);
        assert_eq!(report.producer_stop, ProducerStop::Exhausted);
        assert!(report.record_errors.is_empty());
        assert_eq!(report.message(), "completed: 125 processed");
        assert_eq!(db.products().count().await.unwrap(), 125);
    }

    #[tokio::test]
    async fn test_exact_multiple_stops_on_empty_page() {
        let remote = FakeCatalog::numbered(100);
        let store = RecordingStore::new(Duration::ZERO);
        let sync = FullSync::new(remote.clone(), store, fast_settings(50));

        let report = sync.run(&SilentReporter::default()).await.unwrap();

        assert_eq!(remote.fetch_count(), 3);
        assert_eq!(report.processed, 100);
        assert_eq!(report.producer_stop, ProducerStop::Exhausted);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let remote = FakeCatalog::numbered(0);
        let store = RecordingStore::new(Duration::ZERO);
        let sync = FullSync::new(remote.clone(), store, fast_settings(50));

        let report = sync.run(&SilentReporter::default()).await.unwrap();
        assert_eq!(remote.fetch_count(), 1);
        assert_eq!(report.processed, 0);
        assert_eq!(report.outcome, SyncOutcome::Completed);
    }

    #[tokio::test]
    async fn test_records_upserted_in_fetch_order() {
        let remote = FakeCatalog::numbered(35);
        let store = RecordingStore::new(Duration::ZERO);
        let mut settings = fast_settings(10);
        settings.queue_capacity = 3;
        let sync = FullSync::new(remote, store.clone(), settings);

        sync.run(&SilentReporter::default()).await.unwrap();

        let seen = store.seen.lock().unwrap().clone();
        assert_eq!(seen, (1..=35).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_bad_record_does_not_stop_run() {
        let records: Vec<ProductPayload> = (1..=50)
            .map(|id| {
                let p = ProductPayload::new(id, format!("Product {id}"));
                if id == 17 {
                    p.with_regular_price("not a price")
                } else {
                    p.with_regular_price("9.99")
                }
            })
            .collect();
        let remote = FakeCatalog::with_records(records);
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sync = FullSync::new(remote, db.clone(), fast_settings(50));

        let report = sync.run(&SilentReporter::default()).await.unwrap();

        assert_eq!(report.processed, 50);
        assert_eq!(report.stored(), 49);
        assert_eq!(report.record_errors.len(), 1);
        assert_eq!(report.record_errors[0].remote_id, 17);
        assert_eq!(report.outcome, SyncOutcome::Completed);
        assert_eq!(db.products().count().await.unwrap(), 49);
        assert!(db.products().get_by_remote_id(17).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_error_ends_run_with_partial_count() {
        let mut remote = FakeCatalog::numbered(125);
        remote.fail_page = Some(2);
        let store = RecordingStore::new(Duration::ZERO);
        let sync = FullSync::new(remote.clone(), store, fast_settings(50));

        let report = sync.run(&SilentReporter::default()).await.unwrap();

        assert_eq!(report.processed, 50);
        assert_eq!(report.outcome, SyncOutcome::Completed);
        assert!(matches!(report.producer_stop, ProducerStop::FetchFailed(_)));
        assert_eq!(remote.fetch_count(), 2);
        assert_eq!(report.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_total_failure_is_setup_error() {
        let mut remote = FakeCatalog::numbered(10);
        remote.fail_total = true;
        let store = RecordingStore::new(Duration::ZERO);
        let sync = FullSync::new(remote.clone(), store, fast_settings(50));

        let result = sync.run(&SilentReporter::default()).await;
        assert!(matches!(result, Err(SyncError::Network(_))));
        assert_eq!(remote.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_mid_run() {
        let remote = FakeCatalog::numbered(500);
        let store = RecordingStore::new(Duration::from_millis(2));
        let mut settings = fast_settings(50);
        settings.queue_capacity = 10;
        let sync = FullSync::new(remote, store, settings);

        let tracker = Arc::new(ProgressTracker::new(500));
        let canceller = Arc::clone(&tracker);
        tracker.on_progress(move |event| {
            if event.processed >= 20 {
                canceller.request_cancel();
            }
        });

        let report = timeout(Duration::from_secs(10), sync.run_with_total(500, &*tracker))
            .await
            .expect("sync did not stop after cancel")
            .unwrap();

        assert_eq!(report.outcome, SyncOutcome::Cancelled);
        assert!(report.processed >= 20);
        assert!(report.processed < 500);
        assert!(report.message().starts_with("cancelled: "));
        assert_eq!(tracker.final_report().map(|r| r.processed), Some(report.processed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_within_dequeue_timeout() {
        let remote = FakeCatalog::numbered(1000);
        let store = RecordingStore::new(Duration::from_millis(5));
        let mut settings = fast_settings(50);
        settings.queue_capacity = 10;
        let bound = settings.dequeue_timeout + settings.progress_interval;
        let sync = FullSync::new(remote, store, settings);

        let tracker = Arc::new(ProgressTracker::new(1000));
        let cancelled_at = Arc::new(Mutex::new(None));
        let canceller = Arc::clone(&tracker);
        let stamp = Arc::clone(&cancelled_at);
        tracker.on_progress(move |event| {
            if event.processed >= 30 && !canceller.is_cancelled() {
                *stamp.lock().unwrap() = Some(tokio::time::Instant::now());
                canceller.request_cancel();
            }
        });

        let report = sync.run_with_total(1000, &*tracker).await.unwrap();
        let returned_at = tokio::time::Instant::now();

        let requested = cancelled_at.lock().unwrap().expect("cancel never requested");
        assert_eq!(report.outcome, SyncOutcome::Cancelled);
        assert!(report.processed < 1000);
        assert!(
            returned_at - requested <= bound,
            "run took {:?} to stop after cancel",
            returned_at - requested
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_cancel_keeps_completed_outcome() {
        let remote = FakeCatalog::numbered(60);
        let store = RecordingStore::new(Duration::ZERO);
        let sync = FullSync::new(remote, store, fast_settings(25));

        let tracker = Arc::new(ProgressTracker::new(60));
        let canceller = Arc::clone(&tracker);
        tracker.on_progress(move |event| {
            if event.processed == 60 {
                canceller.request_cancel();
            }
        });

        let report = sync.run_with_total(60, &*tracker).await.unwrap();

        assert_eq!(report.processed, 60);
        assert_eq!(report.outcome, SyncOutcome::Completed);
        assert_eq!(report.message(), "completed: 60 processed");
    }

    #[tokio::test]
    async fn test_zero_durations_are_clamped() {
        let remote = FakeCatalog::numbered(30);
        let store = RecordingStore::new(Duration::ZERO);
        let settings = PipelineSettings {
            page_size: 10,
            queue_capacity: 0,
            dequeue_timeout: Duration::ZERO,
            enqueue_poll: Duration::ZERO,
            progress_interval: Duration::ZERO,
        };
        let sync = FullSync::new(remote, store, settings);

        let report = timeout(
            Duration::from_secs(10),
            sync.run_with_total(30, &SilentReporter::default()),
        )
        .await
        .expect("sync did not finish")
        .unwrap();

        assert_eq!(report.processed, 30);
        assert_eq!(report.outcome, SyncOutcome::Completed);
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let remote = FakeCatalog::numbered(200);
        let store = RecordingStore::new(Duration::ZERO);
        let sync = FullSync::new(remote, store, fast_settings(50));

        let reporter = SilentReporter::default();
        reporter.request_cancel();

        let report = timeout(Duration::from_secs(10), sync.run_with_total(200, &reporter))
            .await
            .expect("sync did not stop after cancel")
            .unwrap();
        assert_eq!(report.outcome, SyncOutcome::Cancelled);
        assert!(report.processed < 200);
    }

    #[tokio::test]
    async fn test_progress_reaches_final_count() {
        let remote = FakeCatalog::numbered(60);
        let store = RecordingStore::new(Duration::ZERO);
        let sync = FullSync::new(remote, store, fast_settings(25));

        let tracker = ProgressTracker::new(0);
        let report = sync.run_with_total(60, &tracker).await.unwrap();

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.processed, 60);
        assert_eq!(snapshot.total, 60);
        assert_eq!(snapshot.message, report.message());
    }
}
