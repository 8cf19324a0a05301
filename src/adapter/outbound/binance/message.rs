//! Aggregate-trade frame decoding.
//!
//! Frames are JSON objects of the form
//! `{"e":"aggTrade","a":26129,"p":"0.01633102","q":"4.70443515","T":1498793709153,...}`.
//! Only `a`, `T`, `p` and `q` are used; everything else is ignored. Combined
//! stream frames (`{"stream":"btcusdt@aggTrade","data":{...}}`) are unwrapped
//! first.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::TradeRecord;
use crate::error::DecodeError;

/// Event type tag carried in the `e` field.
pub const AGG_TRADE_EVENT: &str = "aggTrade";

/// Largest id or timestamp the store can hold.
const MAX_STORED: u64 = i64::MAX as u64;

fn in_store_range(field: &'static str, value: u64) -> Result<u64, DecodeError> {
    if value > MAX_STORED {
        return Err(DecodeError::OutOfRange { field, value });
    }
    Ok(value)
}

/// A numeric field the feed sends either as a decimal string or a JSON number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Text(String),
    Number(f64),
}

impl Numeric {
    fn to_f64(&self, field: &'static str) -> Result<f64, DecodeError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s.trim().parse::<f64>().map_err(|_| DecodeError::InvalidNumber {
                field,
                value: s.clone(),
            })?,
        };
        if !value.is_finite() || value < 0.0 {
            return Err(DecodeError::InvalidNumber {
                field,
                value: value.to_string(),
            });
        }
        Ok(value)
    }
}

/// The fields of an aggregate-trade payload this crate stores.
#[derive(Debug, Clone, Deserialize)]
pub struct AggTradeMessage {
    #[serde(rename = "a")]
    pub aggregate_id: u64,
    #[serde(rename = "T")]
    pub trade_time: u64,
    #[serde(rename = "p")]
    pub price: Numeric,
    #[serde(rename = "q")]
    pub quantity: Numeric,
}

impl AggTradeMessage {
    /// Convert to a domain record.
    ///
    /// # Errors
    ///
    /// Returns an error if price or quantity is not a non-negative finite
    /// number, or if the id or trade time exceeds `i64::MAX`.
    pub fn to_record(&self) -> Result<TradeRecord, DecodeError> {
        Ok(TradeRecord {
            id: in_store_range("a", self.aggregate_id)?,
            trade_time: in_store_range("T", self.trade_time)?,
            price: self.price.to_f64("p")?,
            quantity: self.quantity.to_f64("q")?,
        })
    }
}

/// Decode one text frame into a trade record.
///
/// # Errors
///
/// Returns a [`DecodeError`] for invalid JSON, missing or mistyped fields,
/// unparsable or out-of-range numbers, or an event type other than `aggTrade`.
pub fn decode_frame(text: &str) -> Result<TradeRecord, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    let payload = match value {
        Value::Object(mut map) if map.contains_key("stream") && map.contains_key("data") => {
            map.remove("data").unwrap_or_default()
        }
        other => other,
    };

    if let Some(kind) = payload.get("e").and_then(Value::as_str) {
        if kind != AGG_TRADE_EVENT {
            return Err(DecodeError::UnexpectedEvent(kind.to_string()));
        }
    }

    let message: AggTradeMessage = serde_json::from_value(payload)?;
    message.to_record()
}
