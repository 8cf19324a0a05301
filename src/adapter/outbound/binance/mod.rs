//! Binance aggregate-trade feed adapter.

pub mod message;
pub mod stream;

pub use message::{decode_frame, AggTradeMessage, Numeric, AGG_TRADE_EVENT};
pub use stream::BinanceAggTradeStream;
