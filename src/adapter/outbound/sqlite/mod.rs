//! SQLite persistence adapters.
//!
//! The writer owns batch commits; the reader answers latest-trade queries.
//! Both share one r2d2 pool in-process, and a separate process can open the
//! same file read-side while ingestion runs.

pub mod database;
pub mod reader;
pub mod writer;

pub use database::{create_pool, initialize_schema, DbPool};
pub use reader::SqliteTradeReader;
pub use writer::SqliteTradeWriter;
