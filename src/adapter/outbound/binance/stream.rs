//! Binance aggregate-trade WebSocket stream.
//!
//! # Connection Lifecycle
//!
//! 1. **Connect**: open the raw `<symbol>@aggTrade` stream via `connect()`
//! 2. **Read loop**: `next_event()` decodes text frames into trades
//! 3. **Drop**: close frames, socket errors, end of stream and idle timeouts
//!    all surface as [`FeedEvent::Disconnected`] and discard the socket
//!
//! This type never reconnects on its own; wrap it in
//! [`ReconnectingFeed`](crate::infrastructure::exchange::reconnecting::ReconnectingFeed).

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, trace, warn};

use super::message::decode_frame;
use crate::error::{FeedError, Result};
use crate::port::{FeedEvent, TradeFeed};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Aggregate-trade stream implementing [`TradeFeed`].
pub struct BinanceAggTradeStream {
    endpoint: String,
    idle_timeout: Option<Duration>,
    /// When the last frame arrived. The idle deadline is measured from here,
    /// so a cancelled `next_event` does not restart the clock.
    last_frame: Instant,
    ws: Option<WsStream>,
}

impl BinanceAggTradeStream {
    /// Create a disconnected stream for the given endpoint URL.
    #[must_use]
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            idle_timeout: None,
            last_frame: Instant::now(),
            ws: None,
        }
    }

    /// Treat the connection as dropped when no frame arrives within `limit`.
    #[must_use]
    pub fn with_idle_timeout(mut self, limit: Option<Duration>) -> Self {
        self.idle_timeout = limit;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.ws.is_some()
    }

    async fn read_event(
        ws: &mut WsStream,
        idle_timeout: Option<Duration>,
        last_frame: &mut Instant,
    ) -> FeedEvent {
        loop {
            let frame = match idle_timeout {
                Some(limit) => match timeout_at(*last_frame + limit, ws.next()).await {
                    Ok(frame) => frame,
                    Err(_) => {
                        warn!(idle_ms = limit.as_millis(), "No frames within idle timeout");
                        return FeedEvent::disconnected("idle timeout");
                    }
                },
                None => ws.next().await,
            };
            *last_frame = Instant::now();

            let Some(frame) = frame else {
                warn!("WebSocket stream ended");
                return FeedEvent::disconnected("stream ended");
            };

            match frame {
                Ok(Message::Text(text)) => {
                    return match decode_frame(&text) {
                        Ok(trade) => {
                            trace!(
                                id = trade.id,
                                trade_time = trade.trade_time,
                                price = trade.price,
                                quantity = trade.quantity,
                                "Decoded aggregate trade"
                            );
                            FeedEvent::Trade(trade)
                        }
                        Err(error) => FeedEvent::Malformed {
                            error,
                            bytes: text.len(),
                        },
                    };
                }
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if let Err(e) = ws.send(Message::Pong(data)).await {
                        return FeedEvent::disconnected(format!("failed to send pong: {e}"));
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    return FeedEvent::disconnected(
                        frame.map(|f| f.reason.to_string()).unwrap_or_default(),
                    );
                }
                Ok(_) => continue,
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    return FeedEvent::disconnected(e.to_string());
                }
            }
        }
    }
}

#[async_trait]
impl TradeFeed for BinanceAggTradeStream {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.endpoint, "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(&self.endpoint).await.map_err(|e| {
            FeedError::Connect {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        info!(status = %response.status(), "WebSocket connected");
        self.last_frame = Instant::now();
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        let ws = self.ws.as_mut()?;
        let event = Self::read_event(ws, self.idle_timeout, &mut self.last_frame).await;
        if matches!(event, FeedEvent::Disconnected { .. }) {
            self.ws = None;
        }
        Some(event)
    }

    async fn close(&mut self) {
        if let Some(mut ws) = self.ws.take() {
            match ws.close(None).await {
                Ok(()) => debug!("WebSocket closed"),
                Err(e) => debug!(error = %e, "WebSocket close failed"),
            }
        }
    }

    fn feed_name(&self) -> &'static str {
        "Binance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stream_is_disconnected() {
        let stream = BinanceAggTradeStream::new("wss://test.com/ws/btcusdt@aggTrade".into());
        assert!(!stream.is_connected());
        assert_eq!(stream.endpoint(), "wss://test.com/ws/btcusdt@aggTrade");
        assert_eq!(stream.feed_name(), "Binance");
    }

    #[tokio::test]
    async fn next_event_without_connection_is_none() {
        let mut stream = BinanceAggTradeStream::new("wss://test.com".into());
        assert!(stream.next_event().await.is_none());
    }

    #[tokio::test]
    async fn close_without_connection_is_noop() {
        let mut stream = BinanceAggTradeStream::new("wss://test.com".into());
        stream.close().await;
        assert!(!stream.is_connected());
    }

    #[tokio::test]
    async fn connect_to_unreachable_endpoint_fails() {
        let mut stream = BinanceAggTradeStream::new("ws://127.0.0.1:1/ws".into());
        let err = stream.connect().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Feed(FeedError::Connect { .. })
        ));
        assert!(!stream.is_connected());
    }
}
