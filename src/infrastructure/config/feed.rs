//! Trade feed endpoint configuration.

use serde::Deserialize;
use url::Url;

use crate::error::{ConfigError, Result};

/// Live feed settings.
///
/// The subscription is a single `<symbol>@aggTrade` raw stream appended to
/// the base `url`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// WebSocket base URL (`ws://` or `wss://`).
    pub url: String,
    /// Trading pair, case-insensitive (e.g. `btcusdt`).
    pub symbol: String,
    /// Seconds without any frame before the connection is treated as dropped.
    /// Zero disables idle detection.
    pub idle_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "wss://fstream.binance.com/ws".into(),
            symbol: "btcusdt".into(),
            idle_timeout_secs: 60,
        }
    }
}

impl FeedConfig {
    /// Name of the subscribed stream, e.g. `btcusdt@aggTrade`.
    #[must_use]
    pub fn stream_name(&self) -> String {
        format!("{}@aggTrade", self.symbol.to_lowercase())
    }

    /// Full endpoint URL for the subscription.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), self.stream_name())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(ConfigError::MissingField { field: "feed.url" }.into());
        }
        let parsed = Url::parse(&self.url).map_err(|e| ConfigError::InvalidValue {
            field: "feed.url",
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(ConfigError::InvalidValue {
                field: "feed.url",
                reason: format!("scheme must be ws or wss, got {}", parsed.scheme()),
            }
            .into());
        }

        if self.symbol.is_empty() {
            return Err(ConfigError::MissingField {
                field: "feed.symbol",
            }
            .into());
        }
        if !self.symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::InvalidValue {
                field: "feed.symbol",
                reason: "must be alphanumeric".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
