//! Command-line surface

use clap::Parser;
use std::time::Duration;

use crate::config::{ImportConfig, TransformKind};
use crate::error::Result;
use crate::sequencer::{SourceSet, DEFAULT_CHUNK_SIZE, DEFAULT_PROGRESS_INTERVAL};
use crate::store::{StoreConfig, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_CONNECTIONS};

const AFTER_HELP: &str = "\
To import one or more files:
  lineload [OPTIONS] file1 [file2 [file3 [...]]]
To import from stdin:
  lineload [OPTIONS] - [id_prefix]
  lineload [OPTIONS] - -- -id_prefix   (prefix starting with '-')

Document ids are the file name plus the zero-padded line number
(data.txt-000000000001). When reading stdin the id prefix is used instead,
or a random 10-character token if none is given.";

#[derive(Parser, Debug)]
#[command(name = "lineload")]
#[command(author, version, about = "Import line-delimited text into a document store")]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Store host, as host[:port] or user:password@host[:port]
    #[arg(long, env = "LINELOAD_HOST")]
    pub host: String,

    /// Store database name
    #[arg(long, env = "LINELOAD_DB")]
    pub db: String,

    /// Collection (table) receiving the documents
    #[arg(long, env = "LINELOAD_COLLECTION")]
    pub collection: String,

    /// How each line becomes a document
    #[arg(
        long,
        value_enum,
        default_value_t = TransformKind::Text,
        env = "LINELOAD_TRANSFORM"
    )]
    pub transform: TransformKind,

    /// Bytes requested per read
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, env = "LINELOAD_CHUNK_SIZE")]
    pub chunk_size: usize,

    /// Maximum store connections
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        env = "LINELOAD_MAX_CONNECTIONS"
    )]
    pub max_connections: u32,

    /// Store connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "LINELOAD_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Seconds between progress logs while waiting for inserts (0 disables)
    #[arg(
        long,
        default_value_t = DEFAULT_PROGRESS_INTERVAL.as_secs(),
        env = "LINELOAD_PROGRESS_INTERVAL"
    )]
    pub progress_interval: u64,

    /// Read and transform everything but write nowhere
    #[arg(long, env = "LINELOAD_DRY_RUN")]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Files to import, or '-' followed by an optional id prefix for stdin
    #[arg(required = true, value_name = "SOURCES")]
    pub sources: Vec<String>,
}

impl Cli {
    /// Resolve arguments into a validated configuration
    ///
    /// The stdin source name is fixed here, before anything is read.
    pub fn into_config(self) -> Result<ImportConfig> {
        let sources = SourceSet::from_args(&self.sources)?;

        let mut store = StoreConfig::new(self.host, self.db, self.collection);
        store.max_connections = self.max_connections;
        store.connect_timeout_secs = self.connect_timeout;

        let config = ImportConfig {
            store,
            sources,
            transform: self.transform,
            chunk_size: self.chunk_size,
            progress_interval: Duration::from_secs(self.progress_interval),
            dry_run: self.dry_run,
        };
        config.validate()?;

        Ok(config)
    }
}
