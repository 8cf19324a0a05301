//! SQLite database modules.
//!
//! Provides connection pooling, schema reset, table definitions and the
//! Diesel row type for the trades table.

pub mod connection;
pub mod model;
pub mod schema;

pub use connection::{create_pool, initialize_schema, DbPool};
