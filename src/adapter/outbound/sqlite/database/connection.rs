//! Database connection management using Diesel ORM.
//!
//! Every pooled connection gets the same pragmas: WAL journaling so the
//! reader never sees a half-written batch and never blocks the writer, a busy
//! timeout for lock contention, and `synchronous = NORMAL`.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{debug, info};

use crate::error::{Result, StorageError};

/// Embedded database migrations compiled from the migrations/ directory.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Type alias for a SQLite connection pool.
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const POOL_SIZE: u32 = 5;
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Applies [`configure_sqlite_connection`] to each new pooled connection.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        configure_sqlite_connection(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Create a connection pool for the given database path.
///
/// # Errors
/// Returns an error if the pool cannot be created.
pub fn create_pool(database_url: &str) -> Result<DbPool> {
    // Probe once so an unopenable path fails now instead of after the pool's
    // connection timeout.
    SqliteConnection::establish(database_url).map_err(|e| StorageError::Pool(e.to_string()))?;

    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(POOL_SIZE)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .map_err(|e| StorageError::Pool(e.to_string()))?;
    debug!(database = database_url, "SQLite pool created");
    Ok(pool)
}

/// Reset the trades table to an empty state.
///
/// Existing trade data is discarded: all migrations are reverted, any stray
/// `trades` table left by an unmanaged writer is dropped, and the schema is
/// recreated from the embedded migrations.
///
/// # Errors
/// Returns [`StorageError::Init`] if any step fails.
pub fn initialize_schema(pool: &DbPool) -> Result<()> {
    let init = |e: &dyn std::fmt::Display| StorageError::Init(e.to_string());

    let mut conn = pool.get().map_err(|e| init(&e))?;
    conn.revert_all_migrations(MIGRATIONS).map_err(|e| init(&e))?;
    diesel::sql_query("DROP TABLE IF EXISTS trades")
        .execute(&mut conn)
        .map_err(|e| init(&e))?;
    conn.run_pending_migrations(MIGRATIONS).map_err(|e| init(&e))?;

    info!("Trades table reset");
    Ok(())
}

/// Configure SQLite connection pragmas.
///
/// # Errors
/// Returns an error if a pragma fails to apply.
pub fn configure_sqlite_connection(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(&format!(
        "PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}; \
         PRAGMA journal_mode = WAL; \
         PRAGMA synchronous = NORMAL;"
    ))
}
