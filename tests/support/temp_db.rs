use std::path::PathBuf;

use tempfile::TempDir;
use tradetape::adapter::outbound::sqlite::{DbPool, SqliteTradeReader, SqliteTradeWriter};
use tradetape::infrastructure::bootstrap::init_storage;

/// Temporary SQLite database with a freshly reset trades table.
pub struct TempDb {
    _dir: TempDir,
    path: PathBuf,
    pool: DbPool,
}

impl TempDb {
    pub fn create() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("trades.db");
        let pool = init_storage(path.to_str().expect("utf-8 path")).expect("init storage");
        Self {
            _dir: dir,
            path,
            pool,
        }
    }

    pub fn path(&self) -> &str {
        self.path.to_str().expect("utf-8 path")
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn writer(&self) -> SqliteTradeWriter {
        SqliteTradeWriter::new(self.pool.clone())
    }

    pub fn reader(&self) -> SqliteTradeReader {
        SqliteTradeReader::new(self.pool.clone())
    }
}
