//! Error types for lineload
//!
//! Only failures that stop an import live here. A failed insert of a single
//! record is logged by the tracker and never surfaces as an `ImportError`.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;
use crate::transform::TransformError;

/// Result type alias for import operations
pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Error, Debug)]
pub enum ImportError {
    /// Invalid command line or configuration, raised before anything is read
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to open '{}': {source}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read from '{name}': {source}")]
    SourceRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The transformation hook rejected a line
    #[error("Transform failed at {name}:{line_number}: {source}")]
    Transform {
        name: String,
        line_number: u64,
        #[source]
        source: TransformError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ImportError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
