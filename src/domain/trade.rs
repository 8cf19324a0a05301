//! Trade records and batches.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One aggregate trade as reported by the feed.
///
/// `id` is the feed-assigned aggregate-trade identifier and the storage key.
/// It is normally non-decreasing but may repeat after a reconnect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeRecord {
    pub id: u64,
    /// Milliseconds since the Unix epoch.
    pub trade_time: u64,
    pub price: f64,
    pub quantity: f64,
}

impl TradeRecord {
    #[must_use]
    pub const fn new(id: u64, trade_time: u64, price: f64, quantity: f64) -> Self {
        Self {
            id,
            trade_time,
            price,
            quantity,
        }
    }

    /// Trade time as a UTC timestamp, if it is representable.
    #[must_use]
    pub fn traded_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.trade_time)
            .ok()
            .and_then(DateTime::from_timestamp_millis)
    }

    /// The `{trade_time, price}` view served to polling readers.
    #[must_use]
    pub const fn price_point(&self) -> PricePoint {
        PricePoint {
            trade_time: self.trade_time,
            price: self.price,
        }
    }
}

/// A time-series point for chart clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub trade_time: u64,
    pub price: f64,
}

/// A drained buffer generation on its way to storage.
///
/// Records keep feed arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// Monotonic buffer generation this batch was drained from.
    pub generation: u64,
    pub records: Vec<TradeRecord>,
}

impl Batch {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest trade time in the batch.
    #[must_use]
    pub fn max_trade_time(&self) -> Option<u64> {
        self.records.iter().map(|r| r.trade_time).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traded_at_converts_millis() {
        let trade = TradeRecord::new(1, 1_700_000_000_123, 1.0, 1.0);
        let at = trade.traded_at().unwrap();
        assert_eq!(at.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn traded_at_rejects_out_of_range() {
        let trade = TradeRecord::new(1, u64::MAX, 1.0, 1.0);
        assert!(trade.traded_at().is_none());
    }

    #[test]
    fn price_point_serializes_two_fields() {
        let point = TradeRecord::new(7, 200, 42_000.5, 0.01).price_point();
        let json = serde_json::to_string(&point).unwrap();
        assert_eq!(json, r#"{"trade_time":200,"price":42000.5}"#);
    }

    #[test]
    fn batch_max_trade_time_ignores_order() {
        let batch = Batch {
            generation: 0,
            records: vec![
                TradeRecord::new(1, 100, 1.0, 1.0),
                TradeRecord::new(2, 200, 1.0, 1.0),
                TradeRecord::new(3, 150, 1.0, 1.0),
            ],
        };
        assert_eq!(batch.max_trade_time(), Some(200));
        assert_eq!(batch.len(), 3);
    }
}
