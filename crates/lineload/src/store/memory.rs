//! In-process document store

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::{DocumentStore, StoreError};

/// Documents kept in a map, ordered by id
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn get(&self, id: &str) -> Option<Value> {
        self.lock().get(id).cloned()
    }

    /// Stored ids in ascending order
    pub fn ids(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.documents.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, id: &str, document: &Value) -> Result<(), StoreError> {
        let mut documents = self.lock();
        if documents.contains_key(id) {
            return Err(StoreError::Duplicate(id.to_string()));
        }
        documents.insert(id.to_string(), document.clone());
        Ok(())
    }
}
