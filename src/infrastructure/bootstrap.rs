//! Infrastructure bootstrap helpers for runtime wiring.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::binance::BinanceAggTradeStream;
use crate::adapter::outbound::sqlite::{
    create_pool, initialize_schema, DbPool, SqliteTradeReader,
};
use crate::domain::IngestStats;
use crate::error::{Result, StorageError};
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::exchange::ReconnectingFeed;

/// Open the database for writing and reset the trades table.
///
/// Missing parent directories are created. Every failure here is
/// [`StorageError::Init`].
///
/// # Errors
///
/// Returns an error if the file cannot be opened or the schema reset fails.
pub fn init_storage(database: &str) -> Result<DbPool> {
    if let Some(parent) = Path::new(database).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Init(format!("{}: {e}", parent.display())))?;
        }
    }

    let pool = create_pool(database).map_err(|e| StorageError::Init(e.to_string()))?;
    initialize_schema(&pool)?;
    info!(database, "Database initialized");
    Ok(pool)
}

/// Open an existing database for reading. Never touches the schema.
///
/// # Errors
///
/// Returns [`StorageError::NotFound`] if the file does not exist.
pub fn open_reader(database: &str) -> Result<SqliteTradeReader> {
    if !Path::new(database).exists() {
        return Err(StorageError::NotFound(database.to_string()).into());
    }
    let pool = create_pool(database)?;
    Ok(SqliteTradeReader::new(pool))
}

/// Build the live feed described by `config`, wrapped for reconnection.
#[must_use]
pub fn build_feed(
    config: &Config,
    stats: Arc<IngestStats>,
) -> ReconnectingFeed<BinanceAggTradeStream> {
    let idle_timeout = match config.feed.idle_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let stream = BinanceAggTradeStream::new(config.feed.endpoint()).with_idle_timeout(idle_timeout);
    ReconnectingFeed::new(stream, config.reconnection.clone()).with_stats(stats)
}
