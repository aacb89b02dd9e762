//! lineload common library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Infrastructure shared by the lineload workspace members. Currently this is
//! the `tracing` subscriber setup used by every binary.

pub mod logging;

pub use logging::{init_logging, LogConfig, LogGuard};
