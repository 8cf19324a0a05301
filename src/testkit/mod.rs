//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`stream`] - Mock [`TradeFeed`](crate::port::TradeFeed) implementations:
//!   `ScriptedFeed`, `ChannelFeed`.
//! - [`store`] - In-memory [`TradeSink`](crate::port::TradeSink) /
//!   [`TradeReader`](crate::port::TradeReader) with scripted failures.
//! - [`domain`] - Builders for trades, feed events and raw frames.
//! - [`config`] - Canonical test configurations (reconnection, ingest).

pub mod config;
pub mod domain;
pub mod store;
pub mod stream;
