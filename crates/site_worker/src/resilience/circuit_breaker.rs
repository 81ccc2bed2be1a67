use common::domain::{DomainError, DomainResult};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Fraction of failures in the window that trips the breaker, in (0, 1].
    pub failure_rate_threshold: f64,
    /// Number of most recent calls considered when computing the rate.
    pub window_size: usize,
    /// Calls required in the window before the rate is evaluated at all.
    pub min_calls: usize,
    /// How long an open breaker rejects calls before probing again.
    pub open_cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_rate_threshold: 0.5,
            window_size: 10,
            min_calls: 5,
            open_cooldown: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    // true = failure, most recent at the back
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
}

/// Rolling-window circuit breaker guarding the document store.
///
/// Closed: calls pass through, outcomes feed the window. Open: calls are
/// rejected with `ServiceUnavailable` until the cooldown elapses, then one
/// probe is admitted (half-open). A successful probe closes the breaker and
/// clears the window; a failed probe re-opens it.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: &'static str,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            config,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                window: VecDeque::new(),
                opened_at: None,
            }),
        }
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    /// Run `fut` under the breaker. Rejected calls never reach the store.
    pub async fn call<T, Fut>(&self, fut: Fut) -> DomainResult<T>
    where
        Fut: Future<Output = DomainResult<T>>,
    {
        self.try_acquire()?;
        let result = fut.await;
        self.record(&result);
        result
    }

    fn try_acquire(&self) -> DomainResult<()> {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed | BreakerState::HalfOpen => Ok(()),
            BreakerState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed());
                if elapsed.is_some_and(|e| e >= self.config.open_cooldown) {
                    info!(breaker = self.name, "cooldown elapsed, admitting probe");
                    inner.state = BreakerState::HalfOpen;
                    Ok(())
                } else {
                    Err(DomainError::ServiceUnavailable(format!(
                        "circuit breaker {} is open",
                        self.name
                    )))
                }
            }
        }
    }

    fn record<T>(&self, result: &DomainResult<T>) {
        let failed = matches!(result, Err(e) if e.is_store_failure());
        let mut inner = self.lock();

        match inner.state {
            BreakerState::HalfOpen => {
                if failed {
                    warn!(breaker = self.name, "probe failed, re-opening");
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                } else {
                    info!(breaker = self.name, "probe succeeded, closing");
                    inner.state = BreakerState::Closed;
                    inner.window.clear();
                    inner.opened_at = None;
                }
            }
            BreakerState::Closed => {
                inner.window.push_back(failed);
                while inner.window.len() > self.config.window_size {
                    inner.window.pop_front();
                }
                if self.should_trip(&inner.window) {
                    warn!(breaker = self.name, "failure rate over threshold, opening");
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(Instant::now());
                }
            }
            // A call admitted while closed can complete after the breaker
            // opened; its outcome no longer matters.
            BreakerState::Open => {}
        }
    }

    fn should_trip(&self, window: &VecDeque<bool>) -> bool {
        if window.len() < self.config.min_calls {
            return false;
        }
        let failures = window.iter().filter(|failed| **failed).count();
        let rate = failures as f64 / window.len() as f64;
        rate >= self.config.failure_rate_threshold
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
