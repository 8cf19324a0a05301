//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                ┌─────────────────────────┐
//!                │   Application (ingest)  │
//!                └───────────┬─────────────┘
//!            ┌───────────────┼────────────────┐
//!            ▼               ▼                ▼
//!      ┌──────────┐    ┌───────────┐    ┌───────────┐
//!      │TradeFeed │    │ TradeSink │    │TradeReader│
//!      │ (Binance)│    │ (SQLite)  │    │ (SQLite)  │
//!      └──────────┘    └───────────┘    └───────────┘
//! ```
//!
//! - [`TradeFeed`] - live trade stream (connect, next event, close)
//! - [`TradeSink`] - atomic batch commits
//! - [`TradeReader`] - point queries for polling readers

pub mod outbound;

pub use outbound::feed::{FeedEvent, TradeFeed};
pub use outbound::store::{TradeReader, TradeSink};
