//! # Progress Reporting
//!
//! The pipeline talks to its observer through [`ProgressReporter`]: counts
//! go out, a cancel request comes back. Nothing here knows how progress is
//! displayed.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Progress and Cancellation                          │
//! │                                                                         │
//! │  FullSync supervising loop                 Caller                      │
//! │  ─────────────────────────                 ──────                      │
//! │  every progress_interval:                                              │
//! │    reporter.report(n, total, msg) ───────► on_progress callbacks       │
//! │    reporter.is_cancelled()?      ◄──────── handle.cancel()             │
//! │      └─ yes: cancel token                  (request_cancel)            │
//! │  at the end:                                                           │
//! │    reporter.complete(&report)    ───────► on_complete callbacks        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info};

use crate::pipeline::SyncReport;

// =============================================================================
// Reporter Trait
// =============================================================================

/// Observer of a running sync.
///
/// `report` is called from the supervising loop and must return quickly.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, processed: u64, total: u64, message: &str);

    fn request_cancel(&self);

    fn is_cancelled(&self) -> bool;

    /// Called once with the final report.
    fn complete(&self, _report: &SyncReport) {}
}

// =============================================================================
// Progress Snapshot
// =============================================================================

/// A point-in-time view of a sync's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub processed: u64,
    pub total: u64,
    pub message: String,
}

impl ProgressEvent {
    /// Completed share in `0.0..=1.0`. An empty catalog counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.processed as f64 / self.total as f64).min(1.0)
    }
}

// =============================================================================
// Callback Tracker
// =============================================================================

type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;
type CompleteCallback = Box<dyn FnOnce(&SyncReport) + Send>;

#[derive(Default)]
struct Completion {
    report: Option<SyncReport>,
    waiting: Vec<CompleteCallback>,
}

/// Reporter that stores the latest counts and fans them out to callbacks.
///
/// Backs [`crate::SyncHandle`]. A completion callback registered after the
/// sync finished is invoked immediately with the stored report.
///
/// Callbacks run on the pipeline's supervising task and must not register
/// further callbacks on the same tracker.
pub struct ProgressTracker {
    processed: AtomicU64,
    total: AtomicU64,
    cancelled: AtomicBool,
    message: Mutex<String>,
    on_progress: Mutex<Vec<ProgressCallback>>,
    completion: Mutex<Completion>,
}

impl std::fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("processed", &self.processed.load(Ordering::Relaxed))
            .field("total", &self.total.load(Ordering::Relaxed))
            .field("cancelled", &self.cancelled.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        ProgressTracker {
            processed: AtomicU64::new(0),
            total: AtomicU64::new(total),
            cancelled: AtomicBool::new(false),
            message: Mutex::new(String::new()),
            on_progress: Mutex::new(Vec::new()),
            completion: Mutex::new(Completion::default()),
        }
    }

    /// Registers a callback for every progress report.
    pub fn on_progress<F>(&self, callback: F)
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.on_progress
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(callback));
    }

    /// Registers a callback for the final report.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce(&SyncReport) + Send + 'static,
    {
        let finished = {
            let mut guard = self.completion.lock().unwrap_or_else(|e| e.into_inner());
            let completion = &mut *guard;
            match &completion.report {
                Some(report) => report.clone(),
                None => {
                    completion.waiting.push(Box::new(callback));
                    return;
                }
            }
        };

        callback(&finished);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    /// Latest counts and message.
    pub fn snapshot(&self) -> ProgressEvent {
        ProgressEvent {
            processed: self.processed(),
            total: self.total(),
            message: self
                .message
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }

    /// The final report, once the sync has finished.
    pub fn final_report(&self) -> Option<SyncReport> {
        self.completion
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .report
            .clone()
    }
}

impl ProgressReporter for ProgressTracker {
    fn report(&self, processed: u64, total: u64, message: &str) {
        self.processed.store(processed, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        *self.message.lock().unwrap_or_else(|e| e.into_inner()) = message.to_string();

        let callbacks: Vec<ProgressCallback> = self
            .on_progress
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if callbacks.is_empty() {
            return;
        }

        let event = ProgressEvent {
            processed,
            total,
            message: message.to_string(),
        };
        for callback in callbacks {
            callback(&event);
        }
    }

    fn request_cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!("Cancellation requested");
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn complete(&self, report: &SyncReport) {
        let waiting = {
            let mut completion = self.completion.lock().unwrap_or_else(|e| e.into_inner());
            completion.report = Some(report.clone());
            std::mem::take(&mut completion.waiting)
        };
        for callback in waiting {
            callback(report);
        }
    }
}

// =============================================================================
// Simple Reporters
// =============================================================================

/// Logs progress through `tracing`.
///
/// Only logs at info level when the count changes by at least `step`, so a
/// fast supervising loop does not flood the log.
#[derive(Debug)]
pub struct TracingReporter {
    step: u64,
    last_logged: AtomicU64,
    cancelled: AtomicBool,
}

impl TracingReporter {
    pub fn new(step: u64) -> Self {
        TracingReporter {
            step: step.max(1),
            last_logged: AtomicU64::new(0),
            cancelled: AtomicBool::new(false),
        }
    }
}

impl Default for TracingReporter {
    fn default() -> Self {
        Self::new(50)
    }
}

impl ProgressReporter for TracingReporter {
    fn report(&self, processed: u64, total: u64, message: &str) {
        let last = self.last_logged.load(Ordering::Relaxed);
        if processed >= last + self.step {
            self.last_logged.store(processed, Ordering::Relaxed);
            info!(processed, total, "{}", message);
        } else {
            debug!(processed, total, "{}", message);
        }
    }

    fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn complete(&self, report: &SyncReport) {
        info!(
            processed = report.processed,
            total = report.total,
            failed = report.record_errors.len(),
            "{}",
            report.message()
        );
    }
}

/// Ignores reports. Still honors cancellation.
#[derive(Debug, Default)]
pub struct SilentReporter {
    cancelled: AtomicBool,
}

impl ProgressReporter for SilentReporter {
    fn report(&self, _processed: u64, _total: u64, _message: &str) {}

    fn request_cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ProducerStop, SyncOutcome};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn report(processed: u64) -> SyncReport {
        SyncReport {
            processed,
            total: 10,
            outcome: SyncOutcome::Completed,
            producer_stop: ProducerStop::Exhausted,
            pages_fetched: 1,
            record_errors: Vec::new(),
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn test_tracker_fans_out_progress() {
        let tracker = ProgressTracker::new(10);
        let seen = Arc::new(AtomicU64::new(0));

        let sink = Arc::clone(&seen);
        tracker.on_progress(move |event| sink.store(event.processed, Ordering::SeqCst));

        tracker.report(4, 10, "syncing");
        assert_eq!(seen.load(Ordering::SeqCst), 4);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.processed, 4);
        assert_eq!(snapshot.message, "syncing");
        assert!((snapshot.fraction() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cancel_flag() {
        let tracker = ProgressTracker::new(0);
        assert!(!tracker.is_cancelled());
        tracker.request_cancel();
        tracker.request_cancel();
        assert!(tracker.is_cancelled());
    }

    #[test]
    fn test_complete_runs_waiting_callbacks_once() {
        let tracker = ProgressTracker::new(10);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        tracker.on_complete(move |r| {
            assert_eq!(r.processed, 10);
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tracker.complete(&report(10));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.final_report().map(|r| r.processed), Some(10));
    }

    #[test]
    fn test_late_on_complete_fires_immediately() {
        let tracker = ProgressTracker::new(10);
        tracker.complete(&report(7));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        tracker.on_complete(move |r| {
            assert_eq!(r.processed, 7);
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fraction_of_empty_catalog() {
        let event = ProgressEvent {
            processed: 0,
            total: 0,
            message: String::new(),
        };
        assert_eq!(event.fraction(), 1.0);
    }

    #[test]
    fn test_silent_reporter_cancel() {
        let reporter = SilentReporter::default();
        reporter.report(1, 2, "ignored");
        reporter.request_cancel();
        assert!(reporter.is_cancelled());
    }
}
