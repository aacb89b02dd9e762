//! Import configuration
//!
//! Everything a run needs, resolved and validated before any source is
//! opened or any connection is made.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{ImportError, Result};
use crate::sequencer::{SourceSet, DEFAULT_CHUNK_SIZE, DEFAULT_PROGRESS_INTERVAL};
use crate::store::StoreConfig;
use crate::transform::{JsonTransform, TextTransform, Transform};

/// Built-in transformation hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TransformKind {
    /// Store each line as {_id, text, filename, lineNumber}
    #[default]
    Text,
    /// Parse each line as a JSON object (blank lines skipped)
    Json,
}

impl TransformKind {
    pub fn build(self) -> Arc<dyn Transform> {
        match self {
            TransformKind::Text => Arc::new(TextTransform),
            TransformKind::Json => Arc::new(JsonTransform),
        }
    }
}

/// Resolved configuration for one import run
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub store: StoreConfig,
    pub sources: SourceSet,
    pub transform: TransformKind,
    pub chunk_size: usize,
    pub progress_interval: Duration,
    /// Transform everything but write nothing
    pub dry_run: bool,
}

impl ImportConfig {
    pub fn new(store: StoreConfig, sources: SourceSet) -> Self {
        Self {
            store,
            sources,
            transform: TransformKind::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            dry_run: false,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.store.validate()?;

        if self.sources.is_empty() {
            return Err(ImportError::config(
                "the file(s) to import must be specified (use '-' to read from standard input)",
            ));
        }

        if self.chunk_size == 0 {
            return Err(ImportError::config("chunk size must be greater than 0"));
        }

        Ok(())
    }
}
