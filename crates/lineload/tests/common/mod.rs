//! Shared fixtures for lineload integration tests
//!
//! Provides a transform that records the order it sees lines in, and a store
//! that holds writes back on demand so tests can observe what happens while
//! inserts are still outstanding.

#![allow(dead_code)]

use async_trait::async_trait;
use lineload::record::Record;
use lineload::store::{DocumentStore, MemoryStore, StoreError};
use lineload::transform::{Outcome, TextTransform, Transform, TransformError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,lineload=debug,sqlx=warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Write `contents` to `name` inside `dir` and return the full path
pub fn write_source(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write source file");
    path
}

/// Delegates to [`TextTransform`] and logs every record id it is handed
///
/// The hook runs synchronously before dispatch, so the log is the dispatch
/// order.
#[derive(Default)]
pub struct RecordingTransform {
    seen: Mutex<Vec<String>>,
}

impl RecordingTransform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("lock").clone()
    }
}

impl Transform for RecordingTransform {
    fn transform(&self, record: &Record) -> Result<Outcome, TransformError> {
        self.seen.lock().expect("lock").push(record.record_id.clone());
        TextTransform.transform(record)
    }
}

/// Memory store whose inserts under `held_prefix` block until an insert
/// under `release_prefix` arrives
pub struct HoldingStore {
    inner: MemoryStore,
    held_prefix: String,
    release_prefix: String,
    gate: Semaphore,
    held_completed: AtomicUsize,
    held_completed_at_release: Mutex<Option<usize>>,
}

impl HoldingStore {
    pub fn new(held_prefix: impl Into<String>, release_prefix: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryStore::new(),
            held_prefix: held_prefix.into(),
            release_prefix: release_prefix.into(),
            gate: Semaphore::new(0),
            held_completed: AtomicUsize::new(0),
            held_completed_at_release: Mutex::new(None),
        })
    }

    pub fn documents(&self) -> &MemoryStore {
        &self.inner
    }

    /// How many held writes had finished when the first releasing write came in
    pub fn held_completed_at_release(&self) -> Option<usize> {
        *self.held_completed_at_release.lock().expect("lock")
    }

    fn release_held(&self) {
        let mut released = self.held_completed_at_release.lock().expect("lock");
        if released.is_none() {
            *released = Some(self.held_completed.load(Ordering::SeqCst));
            // One permit is enough: each held write hands it back on drop
            self.gate.add_permits(1);
        }
    }
}

#[async_trait]
impl DocumentStore for HoldingStore {
    async fn insert(&self, id: &str, document: &Value) -> Result<(), StoreError> {
        if id.starts_with(&self.held_prefix) {
            let _permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| StoreError::config(e.to_string()))?;
            self.inner.insert(id, document).await?;
            self.held_completed.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }

        if id.starts_with(&self.release_prefix) {
            self.release_held();
        }
        self.inner.insert(id, document).await
    }
}
