//! Buffering and flush policy configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Ingest buffer and flush settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// A flush is due once more than this many records are pending.
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
    /// Flush a non-empty buffer at this interval even below the threshold.
    /// Disabled when unset.
    #[serde(default)]
    pub flush_interval_ms: Option<u64>,
    /// Extra commit attempts for a failed batch before its records are dropped.
    #[serde(default)]
    pub commit_retries: u32,
    /// Delay between commit attempts (milliseconds).
    #[serde(default = "default_commit_retry_delay_ms")]
    pub commit_retry_delay_ms: u64,
    /// Interval for the periodic statistics log line.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

const fn default_flush_threshold() -> usize {
    10
}

const fn default_commit_retry_delay_ms() -> u64 {
    100
}

const fn default_stats_interval_secs() -> u64 {
    60
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            flush_threshold: default_flush_threshold(),
            flush_interval_ms: None,
            commit_retries: 0,
            commit_retry_delay_ms: default_commit_retry_delay_ms(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

impl IngestConfig {
    /// The validated flush threshold.
    ///
    /// # Errors
    ///
    /// Returns an error if the threshold is zero.
    pub fn threshold(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.flush_threshold).ok_or_else(|| {
            ConfigError::InvalidValue {
                field: "flush_threshold",
                reason: "must be greater than 0".to_string(),
            }
            .into()
        })
    }

    #[must_use]
    pub fn flush_interval(&self) -> Option<Duration> {
        self.flush_interval_ms.map(Duration::from_millis)
    }

    #[must_use]
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    #[must_use]
    pub fn commit_retry_delay(&self) -> Duration {
        Duration::from_millis(self.commit_retry_delay_ms)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.threshold()?;
        if self.flush_interval_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "flush_interval_ms",
                reason: "must be greater than 0 when set".to_string(),
            }
            .into());
        }
        if self.stats_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "stats_interval_secs",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}
