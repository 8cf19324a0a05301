//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::infrastructure::config::ingest::IngestConfig;
use crate::infrastructure::config::reconnection::ReconnectionConfig;

/// Fast reconnection config with zero delays.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        max_consecutive_failures: 3,
        circuit_breaker_cooldown_ms: 0,
    }
}

/// Count-only flushing with the given threshold and no retries.
pub fn ingest(flush_threshold: usize) -> IngestConfig {
    IngestConfig {
        flush_threshold,
        flush_interval_ms: None,
        commit_retries: 0,
        commit_retry_delay_ms: 0,
        stats_interval_secs: 3600,
    }
}
