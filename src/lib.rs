//! Tradetape - streaming trade ingestion with batched SQLite persistence.
//!
//! Reads the `<symbol>@aggTrade` WebSocket stream, buffers decoded trades in
//! memory and commits them to SQLite in atomic batches, while read-only
//! clients poll the most recent trade.
//!
//! # Architecture
//!
//! ```text
//! feed ──► StreamClient (decode) ──► IngestBuffer ──[> threshold]──► BatchWriter ──► trades table
//!                                                                                       ▲
//!                                                                  TradeReader (latest) ┘
//! ```
//!
//! # Modules
//!
//! - [`domain`] - Trade records, batches and ingest counters
//! - [`port`] - Feed, sink and reader traits
//! - [`application`] - The ingest pipeline (buffer, flush worker, receive loop)
//! - [`adapter`] - Binance stream, SQLite store and the CLI
//! - [`infrastructure`] - Configuration, reconnection policy and wiring
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use tokio::sync::watch;
//! use tradetape::infrastructure::config::settings::Config;
//! use tradetape::infrastructure::orchestration::run_with_shutdown;
//!
//! # async fn example() -> tradetape::error::Result<()> {
//! let config = Config::load_or_default("tradetape.toml")?;
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let summary = run_with_shutdown(&config, shutdown_rx).await?;
//! println!("stored {} trades", summary.rows_inserted);
//! # drop(shutdown_tx);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
