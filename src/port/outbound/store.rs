//! Persistence ports for trade records.
//!
//! Both traits are synchronous: the SQLite adapter blocks on file I/O, so the
//! flush worker drives [`TradeSink`] from `spawn_blocking`.

use crate::domain::{CommitReport, TradeRecord};
use crate::error::Result;

/// Atomic batch writes.
pub trait TradeSink: Send + Sync {
    /// Commit `records` as one transaction.
    ///
    /// Rows whose id is already stored are skipped and counted in
    /// [`CommitReport::skipped`]. On error no row of the batch is visible.
    /// An empty slice is a successful no-op.
    fn commit(&self, records: &[TradeRecord]) -> Result<CommitReport>;
}

/// Read-only point queries, safe to run while a commit is in flight.
pub trait TradeReader: Send + Sync {
    /// The stored trade with the greatest `trade_time`, if any.
    ///
    /// Ties between equal trade times resolve to the highest id.
    fn latest_trade(&self) -> Result<Option<TradeRecord>>;

    /// Number of stored trades.
    fn trade_count(&self) -> Result<u64>;
}
