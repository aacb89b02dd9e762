//! Document store seam
//!
//! The importer only needs one capability from a store: insert a document
//! under an id and report whether that worked. [`DocumentStore`] captures
//! that; [`PostgresStore`] is the production backend, [`MemoryStore`] backs
//! tests and [`DiscardStore`] backs dry runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

mod discard;
mod memory;
mod postgres;

pub use discard::DiscardStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;

// ============================================================================
// Store Configuration Constants
// ============================================================================

/// Default maximum connections in the store pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store configuration error: {0}. Check --host, --db and --collection.")]
    Config(String),

    #[error("Document '{0}' already exists")]
    Duplicate(String),
}

impl StoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Write-capable handle to a collection of documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document under `id`
    ///
    /// An id that already exists is an error, not an overwrite.
    async fn insert(&self, id: &str, document: &Value) -> Result<(), StoreError>;
}

/// Where documents go: host, database and collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// `host[:port]`, optionally with `user:password@` in front
    pub host: String,
    pub database: String,
    /// Table that receives the documents
    pub collection: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl StoreConfig {
    pub fn new(
        host: impl Into<String>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            collection: collection.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }

    pub fn connection_url(&self) -> String {
        format!("postgresql://{}/{}", self.host, self.database)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        if self.host.trim().is_empty() {
            return Err(StoreError::config("host must not be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(StoreError::config("database name must not be empty"));
        }
        if !is_identifier(&self.collection) {
            return Err(StoreError::config(format!(
                "collection '{}' must be letters, digits and underscores, not led by a digit",
                self.collection
            )));
        }
        if self.max_connections == 0 {
            return Err(StoreError::config("max connections must be greater than 0"));
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, safe to splice into SQL as a table name
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
