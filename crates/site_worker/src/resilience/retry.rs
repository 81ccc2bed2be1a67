use common::domain::{DomainError, DomainResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounded retry with exponential backoff around store calls.
///
/// Only store-communication failures are retried; absences and malformed
/// input are deterministic and surface immediately. When the budget is
/// exhausted the last communication failure becomes `ServiceUnavailable`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op`, retrying retryable failures up to the attempt bound.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> DomainResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = DomainResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(attempt, error = %e, "store call failed, retrying");
                    tokio::time::sleep(self.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(DomainError::StoreUnavailable(message)) => {
                    return Err(DomainError::ServiceUnavailable(format!(
                        "retry budget exhausted after {} attempts: {}",
                        attempt, message
                    )));
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt - 1)
    }
}
