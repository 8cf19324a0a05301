//! Mock [`TradeFeed`] implementations for testing.
//!
//! - [`ScriptedFeed`] - Pre-loaded connect results and events.
//!   Best for: reconnection logic, pipeline runs with a known input.
//!
//! - [`ChannelFeed`] - Channel-backed feed with external control handle.
//!   Best for: tests needing on-demand event delivery.
//!
//! Both block forever once they have nothing more to deliver, like a quiet
//! live connection.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use crate::adapter::outbound::binance::decode_frame;
use crate::domain::TradeRecord;
use crate::error::Result;
use crate::port::{FeedEvent, TradeFeed};

// ---------------------------------------------------------------------------
// ScriptedFeed
// ---------------------------------------------------------------------------

/// A mock feed with scripted connect results and a fixed event queue.
///
/// Each call to `connect()` pops the next result (defaults to `Ok(())` when
/// exhausted). When the event queue runs dry, `next_event()` signals
/// [`exhausted`](Self::exhausted) and then pends forever.
pub struct ScriptedFeed {
    connect_results: VecDeque<Result<()>>,
    events: VecDeque<FeedEvent>,
    connect_count: Arc<AtomicU32>,
    close_count: Arc<AtomicU32>,
    exhausted: Arc<Notify>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            events: VecDeque::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
            close_count: Arc::new(AtomicU32::new(0)),
            exhausted: Arc::new(Notify::new()),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_events(mut self, events: Vec<FeedEvent>) -> Self {
        self.events = events.into();
        self
    }

    pub fn with_trades(self, trades: &[TradeRecord]) -> Self {
        self.with_events(trades.iter().copied().map(FeedEvent::Trade).collect())
    }

    /// Decode raw text frames the way the live stream does.
    pub fn with_frames<S: AsRef<str>>(self, frames: &[S]) -> Self {
        let events = frames
            .iter()
            .map(|frame| {
                let frame = frame.as_ref();
                match decode_frame(frame) {
                    Ok(trade) => FeedEvent::Trade(trade),
                    Err(error) => FeedEvent::Malformed {
                        error,
                        bytes: frame.len(),
                    },
                }
            })
            .collect();
        self.with_events(events)
    }

    /// Get shared counters for asserting connect/close call counts.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.close_count.clone())
    }

    /// Notified once every scripted event has been handed out.
    pub fn exhausted(&self) -> Arc<Notify> {
        self.exhausted.clone()
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeFeed for ScriptedFeed {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        if let Some(event) = self.events.pop_front() {
            return Some(event);
        }
        self.exhausted.notify_one();
        std::future::pending().await
    }

    async fn close(&mut self) {
        self.close_count.fetch_add(1, Ordering::SeqCst);
    }

    fn feed_name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// ChannelFeed
// ---------------------------------------------------------------------------

/// A mock feed controlled externally via a [`ChannelFeedHandle`].
pub struct ChannelFeed {
    event_rx: mpsc::UnboundedReceiver<FeedEvent>,
    connect_count: Arc<AtomicU32>,
}

/// Control handle for a [`ChannelFeed`].
pub struct ChannelFeedHandle {
    event_tx: mpsc::UnboundedSender<FeedEvent>,
    connect_count: Arc<AtomicU32>,
}

impl ChannelFeedHandle {
    /// Send an event to the feed.
    pub fn send(&self, event: FeedEvent) {
        let _ = self.event_tx.send(event);
    }

    pub fn send_trade(&self, trade: TradeRecord) {
        self.send(FeedEvent::Trade(trade));
    }

    /// How many times `connect()` was called.
    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }
}

/// Create a [`ChannelFeed`] and its control [`ChannelFeedHandle`].
pub fn channel_feed() -> (ChannelFeed, ChannelFeedHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let cc = Arc::new(AtomicU32::new(0));
    (
        ChannelFeed {
            event_rx: rx,
            connect_count: cc.clone(),
        },
        ChannelFeedHandle {
            event_tx: tx,
            connect_count: cc,
        },
    )
}

#[async_trait]
impl TradeFeed for ChannelFeed {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        match self.event_rx.recv().await {
            Some(event) => Some(event),
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {
        self.event_rx.close();
    }

    fn feed_name(&self) -> &'static str {
        "mock"
    }
}
