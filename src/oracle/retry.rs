use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, warn};

use crate::config::OracleConfig;
use crate::error::{GameError, OracleError, Result};

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each later one
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(cfg: &OracleConfig) -> Self {
        Self::new(cfg.max_retries, Duration::from_millis(cfg.retry_delay_ms))
    }

    /// Delay after failed attempt number `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => {
                    error!("{} failed with a permanent error: {}", label, e);
                    return Err(e);
                }
                Err(e) => {
                    if attempts >= self.max_attempts {
                        error!("{} failed after {} attempts: {}", label, attempts, e);
                        return Err(GameError::Oracle(OracleError::MaxRetriesExceeded {
                            attempts,
                            last_error: e.to_string(),
                        }));
                    }

                    let delay = self.delay_for(attempts);
                    warn!(
                        "{} attempt {} failed: {}. Retrying in {:?}...",
                        label, attempts, e, delay
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}
