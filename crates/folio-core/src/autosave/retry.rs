//! Bounded retry with exponential backoff for background saves.

use std::time::Duration;

use folio_types::config::AutoSaveConfig;

/// Stateless: the scheduler owns the attempt counter.
pub struct RetryPolicy;

impl RetryPolicy {
    /// `attempt` is the number of failures so far (1 after the first).
    pub fn should_retry(config: &AutoSaveConfig, attempt: u32) -> bool {
        attempt < config.max_retries
    }

    /// `retry_base_ms * 2^(attempt - 1)`, capped at `retry_max_ms`.
    pub fn backoff(config: &AutoSaveConfig, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let ms = config
            .retry_base_ms
            .saturating_mul(1u64 << exponent)
            .min(config.retry_max_ms);
        Duration::from_millis(ms)
    }
}
