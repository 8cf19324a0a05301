//! Reconnecting wrapper for [`TradeFeed`].
//!
//! Disconnects are absorbed here. The caller only ever sees trades and
//! malformed frames, and whatever it buffered before the drop stays buffered.
//! Attempts back off exponentially with jitter; after too many consecutive
//! failures a circuit breaker holds further attempts for a cooldown.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use crate::domain::IngestStats;
use crate::error::Error;
use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::port::{FeedEvent, TradeFeed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    Closed,
    /// Attempts are held until `until`.
    Open { until: Instant },
}

/// A [`TradeFeed`] that reconnects its inner feed whenever it drops.
///
/// [`next_event`](TradeFeed::next_event) never yields
/// [`FeedEvent::Disconnected`] and never returns `None`; it keeps retrying
/// until a frame arrives.
pub struct ReconnectingFeed<F: TradeFeed> {
    inner: F,
    config: ReconnectionConfig,
    stats: Option<Arc<IngestStats>>,
    consecutive_failures: u32,
    /// Base delay for the next attempt, before jitter.
    current_delay_ms: u64,
    circuit_state: CircuitState,
    /// Deadline of the pending attempt. Survives a dropped read so the
    /// wait resumes instead of restarting.
    retry_at: Option<Instant>,
    connected: bool,
}

impl<F: TradeFeed> ReconnectingFeed<F> {
    /// Wrap `inner`. Nothing connects until [`connect`](TradeFeed::connect)
    /// or the first read.
    pub fn new(inner: F, config: ReconnectionConfig) -> Self {
        Self {
            current_delay_ms: config.initial_delay_ms,
            inner,
            config,
            stats: None,
            consecutive_failures: 0,
            circuit_state: CircuitState::Closed,
            retry_at: None,
            connected: false,
        }
    }

    /// Count successful reconnects in `stats`.
    #[must_use]
    pub fn with_stats(mut self, stats: Arc<IngestStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    fn reset_backoff(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
        self.circuit_state = CircuitState::Closed;
    }

    /// Delay for this attempt. Advances the base delay for the next one.
    fn next_delay(&mut self) -> Duration {
        let base = Duration::from_millis(self.current_delay_ms);
        let grown = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = grown.min(self.config.max_delay_ms);
        base + Duration::from_millis(self.jitter_ms(base))
    }

    /// Pseudo-random jitter in `0..=base/5` milliseconds.
    fn jitter_ms(&self, base: Duration) -> u64 {
        let span = (base.as_millis() as u64) / 5;
        if span == 0 {
            return 0;
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.subsec_nanos());
        u64::from(nanos) % (span + 1)
    }

    /// Closes an open circuit whose cooldown has passed.
    fn circuit_allows_connection(&mut self) -> bool {
        match self.circuit_state {
            CircuitState::Closed => true,
            CircuitState::Open { until } if Instant::now() >= until => {
                info!("Circuit breaker cooldown expired, allowing reconnection");
                self.reset_backoff();
                true
            }
            CircuitState::Open { .. } => false,
        }
    }

    fn record_failure(&mut self) {
        self.connected = false;
        self.consecutive_failures += 1;
        if self.consecutive_failures < self.config.max_consecutive_failures {
            return;
        }

        let cooldown = Duration::from_millis(self.config.circuit_breaker_cooldown_ms);
        self.circuit_state = CircuitState::Open {
            until: Instant::now() + cooldown,
        };
        error!(
            failures = self.consecutive_failures,
            cooldown_secs = cooldown.as_secs(),
            "Circuit breaker tripped, pausing reconnection attempts"
        );
    }

    /// When the next attempt may start: after any open-circuit cooldown,
    /// plus the backoff delay.
    fn schedule_attempt(&mut self) -> Instant {
        let mut start = Instant::now();
        if let CircuitState::Open { until } = self.circuit_state {
            if !self.circuit_allows_connection() {
                warn!(
                    remaining_secs = until.saturating_duration_since(start).as_secs(),
                    "Circuit breaker open, waiting for cooldown"
                );
                start = until;
                self.reset_backoff();
            }
        }

        let delay = self.next_delay();
        info!(
            delay_ms = delay.as_millis(),
            attempt = self.consecutive_failures + 1,
            "Reconnecting after delay"
        );
        start + delay
    }

    /// One reconnect attempt. Cancel-safe: dropping the future keeps the
    /// scheduled deadline for the next call.
    async fn reconnect(&mut self) -> Result<(), Error> {
        let deadline = match self.retry_at {
            Some(at) => at,
            None => {
                let at = self.schedule_attempt();
                self.retry_at = Some(at);
                at
            }
        };
        sleep_until(deadline).await;

        let result = self.inner.connect().await;
        self.retry_at = None;
        if let Err(e) = result {
            error!(error = %e, "Reconnection failed");
            self.record_failure();
            return Err(e);
        }

        info!(feed = self.inner.feed_name(), "Reconnected");
        self.connected = true;
        if let Some(stats) = &self.stats {
            stats.record_reconnect();
        }
        Ok(())
    }
}

#[async_trait]
impl<F: TradeFeed> TradeFeed for ReconnectingFeed<F> {
    async fn connect(&mut self) -> Result<(), Error> {
        self.inner.connect().await?;
        self.connected = true;
        self.retry_at = None;
        self.reset_backoff();
        Ok(())
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        loop {
            if !self.connected {
                if let Err(e) = self.reconnect().await {
                    warn!(error = %e, "Reconnection attempt failed, will retry");
                    continue;
                }
            }

            match self.inner.next_event().await {
                Some(FeedEvent::Disconnected { reason }) => {
                    warn!(reason = %reason, "Connection lost, will reconnect");
                    self.record_failure();
                }
                None => {
                    warn!("Trade feed ended unexpectedly, will reconnect");
                    self.record_failure();
                }
                Some(event) => {
                    if self.consecutive_failures > 0 {
                        debug!("Frame received after reconnect, backoff reset");
                        self.reset_backoff();
                    }
                    return Some(event);
                }
            }
        }
    }

    async fn close(&mut self) {
        self.connected = false;
        self.inner.close().await;
    }

    fn feed_name(&self) -> &'static str {
        self.inner.feed_name()
    }
}
