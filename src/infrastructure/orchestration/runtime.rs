//! Ingestion runtime lifecycle.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::adapter::outbound::sqlite::SqliteTradeWriter;
use crate::application::ingest::IngestPipeline;
use crate::domain::{IngestSnapshot, IngestStats};
use crate::error::Result;
use crate::infrastructure::bootstrap::{build_feed, init_storage};
use crate::infrastructure::config::settings::Config;
use crate::port::TradeSink;

/// Reset storage, then stream trades into it until `shutdown` flips to true.
///
/// Returns the final ingest counters once every pending record has been
/// flushed and the storage handle released.
///
/// # Errors
///
/// Returns an error if storage initialization fails (fatal) or the flush
/// worker dies.
pub async fn run_with_shutdown(
    config: &Config,
    shutdown: watch::Receiver<bool>,
) -> Result<IngestSnapshot> {
    info!(
        endpoint = %config.feed.endpoint(),
        database = %config.database,
        flush_threshold = config.ingest.flush_threshold,
        "Starting tradetape"
    );

    let pool = init_storage(&config.database)?;

    let stats = Arc::new(IngestStats::default());
    let feed = build_feed(config, Arc::clone(&stats));
    let sink: Arc<dyn TradeSink> = Arc::new(SqliteTradeWriter::new(pool));

    let pipeline = IngestPipeline::new(feed, sink, &config.ingest, stats)?;
    pipeline.run(shutdown).await
}
