//! Feed reconnection configuration.

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// WebSocket reconnection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectionConfig {
    /// Initial delay before first reconnection attempt (milliseconds).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Maximum delay between reconnection attempts (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Multiplier applied to delay after each failed attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Maximum consecutive failures before circuit breaker trips.
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
    /// Cooldown period after circuit breaker trips (milliseconds).
    #[serde(default = "default_circuit_breaker_cooldown_ms")]
    pub circuit_breaker_cooldown_ms: u64,
}

const fn default_initial_delay_ms() -> u64 {
    1_000
}

const fn default_max_delay_ms() -> u64 {
    60_000
}

const fn default_backoff_multiplier() -> f64 {
    2.0
}

const fn default_max_consecutive_failures() -> u32 {
    10
}

/// Five minutes.
const fn default_circuit_breaker_cooldown_ms() -> u64 {
    300_000
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_consecutive_failures: default_max_consecutive_failures(),
            circuit_breaker_cooldown_ms: default_circuit_breaker_cooldown_ms(),
        }
    }
}

impl ReconnectionConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        let invalid = |field: &'static str, reason: &str| -> Result<()> {
            Err(ConfigError::InvalidValue {
                field,
                reason: reason.to_string(),
            }
            .into())
        };

        if self.initial_delay_ms == 0 {
            return invalid("initial_delay_ms", "must be greater than 0");
        }
        if self.max_delay_ms < self.initial_delay_ms {
            return invalid("max_delay_ms", "must be >= initial_delay_ms");
        }
        if self.backoff_multiplier.is_nan() || self.backoff_multiplier < 1.0 {
            return invalid("backoff_multiplier", "must be >= 1.0");
        }
        if self.max_consecutive_failures == 0 {
            return invalid("max_consecutive_failures", "must be greater than 0");
        }
        if self.circuit_breaker_cooldown_ms == 0 {
            return invalid("circuit_breaker_cooldown_ms", "must be greater than 0");
        }
        Ok(())
    }
}
