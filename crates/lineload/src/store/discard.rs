//! Store that accepts and drops every document

use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{DocumentStore, StoreError};

/// Counts inserts and keeps nothing
///
/// Used for dry runs, where memory must stay flat regardless of input size.
/// Every insert succeeds, so duplicate ids go unnoticed.
#[derive(Debug, Default)]
pub struct DiscardStore {
    accepted: AtomicU64,
}

impl DiscardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents accepted so far
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DocumentStore for DiscardStore {
    async fn insert(&self, _id: &str, _document: &Value) -> Result<(), StoreError> {
        self.accepted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_accepts_everything_including_repeats() {
        let store = DiscardStore::new();
        store.insert("a", &json!({"n": 1})).await.unwrap();
        store.insert("a", &json!({"n": 2})).await.unwrap();
        store.insert("b", &json!(null)).await.unwrap();

        assert_eq!(store.accepted(), 3);
    }
}
