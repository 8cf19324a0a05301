//! The receive loop.
//!
//! ```text
//! feed.next_event() ──► IngestBuffer ──[> threshold]──► FlushHandle ──► worker ──► TradeSink
//!        ▲                                                            (spawn_blocking)
//!        └── tokio::select! with shutdown, optional flush tick, stats tick
//! ```
//!
//! Shutdown is "flush, then exit": the feed is closed, whatever is pending is
//! drained as a final batch, and the call returns once the worker has
//! committed every queued batch.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::buffer::IngestBuffer;
use super::flusher::{spawn_flush_worker, CommitRetry, FlushHandle};
use crate::domain::{IngestSnapshot, IngestStats};
use crate::error::{Error, Result};
use crate::infrastructure::config::ingest::IngestConfig;
use crate::port::{FeedEvent, TradeFeed, TradeSink};

/// Drives one feed into one sink.
pub struct IngestPipeline<F: TradeFeed> {
    feed: F,
    buffer: IngestBuffer,
    flusher: FlushHandle,
    worker: JoinHandle<()>,
    stats: Arc<IngestStats>,
    flush_interval: Option<Duration>,
    stats_interval: Duration,
}

impl<F: TradeFeed> IngestPipeline<F> {
    /// Build the pipeline and start its flush worker.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush threshold is zero.
    pub fn new(
        feed: F,
        sink: Arc<dyn TradeSink>,
        config: &IngestConfig,
        stats: Arc<IngestStats>,
    ) -> Result<Self> {
        let buffer = IngestBuffer::new(config.threshold()?);
        let (flusher, worker) =
            spawn_flush_worker(sink, Arc::clone(&stats), CommitRetry::from(config));
        Ok(Self {
            feed,
            buffer,
            flusher,
            worker,
            stats,
            flush_interval: config.flush_interval(),
            stats_interval: config.stats_interval(),
        })
    }

    /// Run until shutdown is signalled, the shutdown sender is dropped, or
    /// the feed reports it can produce nothing more.
    ///
    /// A failed initial connect is not an error: the next read goes through
    /// the feed's own reconnect policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush worker dies.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<IngestSnapshot> {
        info!(
            feed = self.feed.feed_name(),
            threshold = self.buffer.threshold().get(),
            "Starting ingestion"
        );

        if *shutdown.borrow() {
            return self.finish().await;
        }

        if let Err(e) = self.feed.connect().await {
            warn!(error = %e, "Initial connection failed, will retry");
        }

        let mut flush_tick = self.flush_interval.map(ticker);
        let mut stats_tick = ticker(self.stats_interval);

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                event = self.feed.next_event() => {
                    let Some(event) = event else {
                        warn!("Trade feed ended");
                        break;
                    };
                    self.handle_event(event)?;
                }
                () = tick(&mut flush_tick) => {
                    if !self.buffer.is_empty() {
                        debug!(pending = self.buffer.pending_len(), "Flush interval elapsed");
                        self.buffer.drain_and_flush(&self.flusher)?;
                    }
                }
                _ = stats_tick.tick() => {
                    log_stats(&self.stats.snapshot(), self.buffer.pending_len());
                }
            }
        }

        self.finish().await
    }

    fn handle_event(&mut self, event: FeedEvent) -> Result<()> {
        match event {
            FeedEvent::Trade(record) => {
                self.stats.record_frame();
                self.stats.record_trade();
                self.buffer.offer(record);
                if self.buffer.should_flush() {
                    self.buffer.drain_and_flush(&self.flusher)?;
                }
            }
            FeedEvent::Malformed { error, bytes } => {
                self.stats.record_frame();
                self.stats.record_dropped();
                warn!(error = %error, bytes, "Dropping malformed frame");
            }
            FeedEvent::Disconnected { reason } => {
                warn!(
                    reason = %reason,
                    pending = self.buffer.pending_len(),
                    "Feed disconnected, pending records kept"
                );
            }
        }
        Ok(())
    }

    async fn finish(mut self) -> Result<IngestSnapshot> {
        self.feed.close().await;

        let Self {
            mut buffer,
            flusher,
            worker,
            stats,
            ..
        } = self;

        let remaining = buffer.drain_and_flush(&flusher)?;
        if remaining > 0 {
            info!(records = remaining, "Final flush queued");
        }
        drop(flusher);

        worker.await.map_err(|e| Error::Task(e.to_string()))?;

        let snapshot = stats.snapshot();
        log_stats(&snapshot, 0);
        info!("Ingestion stopped");
        Ok(snapshot)
    }
}

fn ticker(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn log_stats(snapshot: &IngestSnapshot, pending: usize) {
    info!(
        frames = snapshot.frames_received,
        trades = snapshot.trades_decoded,
        malformed = snapshot.frames_dropped,
        reconnects = snapshot.reconnects,
        batches = snapshot.batches_committed,
        failed_batches = snapshot.batches_failed,
        inserted = snapshot.rows_inserted,
        duplicates = snapshot.rows_skipped,
        lost = snapshot.records_lost,
        queued = snapshot.batches_queued,
        pending,
        "Ingest stats"
    );
}
