//! Timeout and bounded retry for calls to the embedding provider.
//!
//! Every attempt is bounded by `timeout`. Transient failures (timeouts,
//! network errors, 429, 5xx) are retried with exponential backoff; permanent
//! failures return on the first attempt.

use std::future::Future;
use std::time::Duration;

use mgdi_types::config::EmbeddingConfig;
use mgdi_types::error::EmbeddingError;

#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub timeout: Duration,
    /// Total attempts, including the first. Treated as at least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(4),
        }
    }
}

impl CallPolicy {
    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_attempts,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Delay before retrying after the given 1-based failed attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }

    /// Run `call` under this policy.
    ///
    /// `call` is invoked once per attempt. When every attempt failed
    /// transiently the last error is wrapped in
    /// [`EmbeddingError::RetriesExhausted`].
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, EmbeddingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EmbeddingError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match tokio::time::timeout(self.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) if !err.is_transient() => return Err(err),
                Ok(Err(err)) => err,
                Err(_) => EmbeddingError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                },
            };

            if attempt >= max_attempts {
                tracing::error!(operation, attempts = attempt, error = %error, "giving up");
                return Err(EmbeddingError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            let delay = self.backoff_for(attempt);
            tracing::warn!(
                operation,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
