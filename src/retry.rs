//! Caller-side retry policy.
//!
//! Neither the retriever nor the vision client retries on its own. The
//! pipeline wraps individual calls with [`RetryExecutor`] when the
//! configuration asks for more than one attempt.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::debug;

use crate::config::RetryConfig;

#[derive(Debug, Clone)]
pub struct BackoffCalculator;

impl BackoffCalculator {
    /// Delay to wait after the failed attempt `attempt` (0-based):
    /// `initial * multiplier^attempt`, capped at `max_backoff_ms`, then
    /// scaled by a random factor in `[1 - jitter, 1 + jitter]`.
    pub fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
        let base_ms = Self::base_delay_ms(config, attempt);
        let jitter = config.jitter_factor.clamp(0.0, 1.0);
        if jitter == 0.0 || base_ms == 0 {
            return Duration::from_millis(base_ms);
        }
        let scale = 1.0 + rand::rng().random_range(-jitter..=jitter);
        Duration::from_millis((base_ms as f64 * scale as f64).round().max(0.0) as u64)
    }

    fn base_delay_ms(config: &RetryConfig, attempt: u32) -> u64 {
        let growth = (config.backoff_multiplier as f64).powi(attempt as i32);
        let raw = config.initial_backoff_ms as f64 * growth;
        if raw.is_finite() {
            (raw as u64).min(config.max_backoff_ms)
        } else {
            config.max_backoff_ms
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RetryExecutor;

impl RetryExecutor {
    /// Run `operation` until it succeeds, `should_retry` declines, or
    /// `config.max_retries` attempts are used up. The last error is returned
    /// unchanged so callers still see the precise failure kind.
    pub async fn execute_with_retry<T, E, Op, Fut, ShouldRetry>(
        config: &RetryConfig,
        mut operation: Op,
        should_retry: ShouldRetry,
    ) -> Result<T, E>
    where
        Op: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        ShouldRetry: Fn(&E, u32) -> bool,
    {
        let max = config.max_retries.max(1);
        let mut attempt: u32 = 0;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    let is_last = attempt + 1 >= max;
                    if is_last || !should_retry(&err, attempt) {
                        return Err(err);
                    }
                    let delay = BackoffCalculator::calculate_delay(config, attempt);
                    debug!(
                        attempt = attempt,
                        next_attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Retry backoff"
                    );
                    attempt += 1;
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
