//! lineload - line-delimited text importer

use anyhow::{Context, Result};
use clap::Parser;
use lineload::cli::Cli;
use lineload::sequencer::Importer;
use lineload::store::{DiscardStore, DocumentStore, PostgresStore};
use lineload_common::logging::{init_logging, LogConfig, LogLevel};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    // Environment variables take precedence over the verbose flag
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("lineload")
        .build()
        .merge_env()?;
    let _log_guard = init_logging(&log_config)?;

    let config = cli.into_config()?;

    let store: Arc<dyn DocumentStore> = if config.dry_run {
        warn!("Dry run: documents are transformed and then dropped, nothing is written");
        Arc::new(DiscardStore::new())
    } else {
        let store = PostgresStore::connect(&config.store)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to store at {} (database '{}')",
                    config.store.host, config.store.database
                )
            })?;
        Arc::new(store)
    };

    info!(
        collection = %config.store.collection,
        sources = config.sources.len(),
        transform = ?config.transform,
        "Starting import"
    );

    let importer = Importer::new(store, config.transform.build())
        .with_chunk_size(config.chunk_size)
        .with_progress_interval(config.progress_interval);

    importer.run(&config.sources).await?;

    Ok(())
}
