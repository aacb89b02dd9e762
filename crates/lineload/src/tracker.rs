//! Write dispatch, in-flight tracking and the completion barrier
//!
//! Every accepted document becomes one spawned write task. Dispatch never
//! waits for the store, so reading continues while writes are outstanding,
//! and nothing bounds how many may be in flight at once.
//!
//! The tracker is a wait-group owned by a single import run. Once the run has
//! dispatched its last write it turns the tracker into a
//! [`CompletionBarrier`], which resolves as soon as the in-flight count is
//! zero.

use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant};
use tokio_util::task::TaskTracker;
use tracing::{error, info, trace};

use crate::store::DocumentStore;

/// Everything a write task needs, including what to log if it fails
#[derive(Debug, Clone)]
pub struct PendingWrite {
    pub source: Arc<str>,
    pub line_number: u64,
    /// Raw line text
    pub text: String,
    /// Key the document is stored under
    pub id: String,
    pub document: Value,
}

/// Write totals for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    pub dispatched: u64,
    pub succeeded: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

/// Tracks the writes dispatched by one run
///
/// Clones share state. Only the run that created the tracker should
/// dispatch; other clones are for observing [`in_flight`](Self::in_flight).
#[derive(Debug, Clone, Default)]
pub struct InsertionTracker {
    tasks: TaskTracker,
    counters: Arc<Counters>,
}

impl InsertionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start writing `write` to `store` without waiting for the result
    ///
    /// The write counts as in flight from the moment this returns until the
    /// store resolves it. A failed write is logged and counted; it is never
    /// retried and never stops the run.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, store: Arc<dyn DocumentStore>, write: PendingWrite) {
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        let counters = Arc::clone(&self.counters);

        self.tasks.spawn(async move {
            match store.insert(&write.id, &write.document).await {
                Ok(()) => {
                    counters.succeeded.fetch_add(1, Ordering::Relaxed);
                    trace!(id = %write.id, "Record inserted");
                },
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::Relaxed);
                    error!(
                        source = %write.source,
                        line = write.line_number,
                        text = %write.text,
                        error = %e,
                        "Failed to insert record"
                    );
                },
            }
        });
    }

    /// Writes dispatched but not yet resolved
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    pub fn summary(&self) -> WriteSummary {
        WriteSummary {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            succeeded: self.counters.succeeded.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting new work and hand over to the barrier
    ///
    /// Call only after the last dispatch of the run.
    pub fn into_barrier(self) -> CompletionBarrier {
        self.tasks.close();
        CompletionBarrier { tracker: self }
    }
}

/// Resolves once every dispatched write has resolved
#[derive(Debug)]
pub struct CompletionBarrier {
    tracker: InsertionTracker,
}

impl CompletionBarrier {
    /// Wait for the in-flight count to reach zero
    ///
    /// Logs the outstanding count every `progress_interval` while waiting;
    /// a zero interval disables the progress log. Consumes the barrier, so
    /// completion is observed exactly once.
    pub async fn wait(self, progress_interval: Duration) -> WriteSummary {
        let tasks = &self.tracker.tasks;
        let done = tasks.wait();
        tokio::pin!(done);

        if progress_interval.is_zero() {
            done.await;
        } else {
            let mut ticker = interval_at(Instant::now() + progress_interval, progress_interval);
            loop {
                tokio::select! {
                    _ = &mut done => break,
                    _ = ticker.tick() => {
                        info!(outstanding = tasks.len(), "Waiting for outstanding inserts");
                    }
                }
            }
        }

        let summary = self.tracker.summary();
        info!(
            dispatched = summary.dispatched,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "All inserts resolved"
        );
        summary
    }
}
