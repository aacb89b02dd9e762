//! lineload library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Imports line-delimited text into a document store. Each line of each
//! source becomes a record with a stable id (`{source}-{line:012}`), a
//! transformation hook turns the record into a document or skips it, and
//! accepted documents are written without blocking the read loop.
//!
//! # Pipeline
//!
//! - [`splitter`]: rebuilds lines from arbitrarily sized byte chunks
//! - [`record`]: record construction and id generation
//! - [`transform`]: the hook seam and the built-in hooks
//! - [`tracker`]: write dispatch, in-flight tracking, completion barrier
//! - [`sequencer`]: reads sources one at a time and drives the run
//! - [`store`]: the document store seam (PostgreSQL, in-memory)
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use lineload::sequencer::{Importer, SourceSet};
//! use lineload::store::MemoryStore;
//! use lineload::transform::TextTransform;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let importer = Importer::new(store.clone(), Arc::new(TextTransform));
//!
//!     let sources = SourceSet::from_args(&["access.log"])?;
//!     let summary = importer.run(&sources).await?;
//!     assert_eq!(summary.writes.succeeded as usize, store.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod record;
pub mod sequencer;
pub mod splitter;
pub mod store;
pub mod tracker;
pub mod transform;

pub use error::{ImportError, Result};
pub use sequencer::{Importer, RunSummary, SourceSet};
