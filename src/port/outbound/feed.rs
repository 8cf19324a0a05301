//! Trade feed port.

use async_trait::async_trait;

use crate::domain::TradeRecord;
use crate::error::{DecodeError, Error};

/// Events produced by a trade feed.
#[derive(Debug)]
pub enum FeedEvent {
    /// A decoded aggregate trade.
    Trade(TradeRecord),
    /// A frame that could not be decoded. The stream continues.
    Malformed {
        /// Why the frame was rejected.
        error: DecodeError,
        /// Size of the raw frame in bytes.
        bytes: usize,
    },
    /// Connection lost (may reconnect).
    Disconnected {
        /// The disconnection reason.
        reason: String,
    },
}

impl FeedEvent {
    /// Build a disconnect event.
    pub fn disconnected(reason: impl Into<String>) -> Self {
        Self::Disconnected {
            reason: reason.into(),
        }
    }
}

/// A persistent connection to a live trade stream.
///
/// One implementation owns one socket. A connection produces events until it
/// drops; after [`FeedEvent::Disconnected`] the caller must call
/// [`connect`](TradeFeed::connect) again before reading.
#[async_trait]
pub trait TradeFeed: Send {
    /// Open the connection and subscribe to the trade channel.
    async fn connect(&mut self) -> Result<(), Error>;

    /// Receive the next event.
    ///
    /// Suspends until a frame arrives or the connection drops. Returns `None`
    /// when the feed is closed or was never connected.
    async fn next_event(&mut self) -> Option<FeedEvent>;

    /// Close the connection. Further reads return `None` until reconnected.
    async fn close(&mut self);

    /// Feed name for logging.
    fn feed_name(&self) -> &'static str;
}

#[async_trait]
impl TradeFeed for Box<dyn TradeFeed> {
    async fn connect(&mut self) -> Result<(), Error> {
        (**self).connect().await
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        (**self).next_event().await
    }

    async fn close(&mut self) {
        (**self).close().await;
    }

    fn feed_name(&self) -> &'static str {
        (**self).feed_name()
    }
}
