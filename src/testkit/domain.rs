//! Builders for domain primitives and raw feed frames.

use serde_json::json;

use crate::domain::TradeRecord;
use crate::port::FeedEvent;

/// A trade whose price is derived from its id, so rows are easy to tell apart.
pub fn trade(id: u64, trade_time: u64) -> TradeRecord {
    TradeRecord::new(id, trade_time, 100.0 + id as f64, 0.5)
}

/// `count` trades with consecutive ids starting at `first_id`, 10 ms apart.
pub fn trades(first_id: u64, count: u64) -> Vec<TradeRecord> {
    (first_id..first_id + count)
        .map(|id| trade(id, 1_700_000_000_000 + id * 10))
        .collect()
}

pub fn trade_event(id: u64, trade_time: u64) -> FeedEvent {
    FeedEvent::Trade(trade(id, trade_time))
}

pub fn disconnect_event(reason: &str) -> FeedEvent {
    FeedEvent::disconnected(reason)
}

/// A well-formed aggTrade text frame for `record`, with string price/quantity
/// the way the exchange sends them.
pub fn agg_trade_frame(record: &TradeRecord) -> String {
    json!({
        "e": "aggTrade",
        "E": record.trade_time + 5,
        "s": "BTCUSDT",
        "a": record.id,
        "p": record.price.to_string(),
        "q": record.quantity.to_string(),
        "f": record.id * 10,
        "l": record.id * 10 + 1,
        "T": record.trade_time,
        "m": false,
    })
    .to_string()
}

/// An aggTrade frame with the `p` field missing.
pub fn frame_without_price(id: u64, trade_time: u64) -> String {
    json!({
        "e": "aggTrade",
        "a": id,
        "q": "1.0",
        "T": trade_time,
    })
    .to_string()
}
