//! Feed-agnostic domain types.

pub mod stats;
pub mod trade;

pub use stats::{CommitReport, IngestSnapshot, IngestStats};
pub use trade::{Batch, PricePoint, TradeRecord};
