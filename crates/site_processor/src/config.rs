use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};
use site_worker::resilience::{CircuitBreakerConfig, RetryPolicy};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SiteProcessorConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// JetStream stream carrying site change events
    #[serde(default = "default_stream")]
    pub site_events_stream: String,

    /// Subject pattern for the consumer filter
    #[serde(default = "default_subject")]
    pub site_events_subject: String,

    /// Durable consumer name
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,

    /// Batch size for the pull consumer
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for batches in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// Startup timeout for initialization operations in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    // Store resilience
    /// Attempt bound for store calls, first attempt included
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Base backoff delay between store retries in milliseconds
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    /// Failure fraction in the rolling window that opens the breaker
    #[serde(default = "default_breaker_failure_rate_threshold")]
    pub breaker_failure_rate_threshold: f64,

    /// Rolling window size in calls
    #[serde(default = "default_breaker_window_size")]
    pub breaker_window_size: usize,

    /// Calls required before the failure rate is evaluated
    #[serde(default = "default_breaker_min_calls")]
    pub breaker_min_calls: usize,

    /// How long an open breaker rejects calls, in milliseconds
    #[serde(default = "default_breaker_cooldown_ms")]
    pub breaker_cooldown_ms: u64,

    /// Max entries in the site projection cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_stream() -> String {
    "site_events".to_string()
}

fn default_subject() -> String {
    "site_events.>".to_string()
}

fn default_consumer_name() -> String {
    "site-processor".to_string()
}

fn default_nats_batch_size() -> usize {
    30
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_startup_timeout_secs() -> u64 {
    30
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    200
}

fn default_breaker_failure_rate_threshold() -> f64 {
    0.5
}

fn default_breaker_window_size() -> usize {
    10
}

fn default_breaker_min_calls() -> usize {
    5
}

fn default_breaker_cooldown_ms() -> u64 {
    30_000
}

fn default_cache_capacity() -> u64 {
    10_000
}

impl SiteProcessorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("SITE_PROCESSOR"))
            .build()?
            .try_deserialize()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }

    pub fn breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_rate_threshold: self.breaker_failure_rate_threshold,
            window_size: self.breaker_window_size,
            min_calls: self.breaker_min_calls,
            open_cooldown: Duration::from_millis(self.breaker_cooldown_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure tests run serially and don't interfere with each other
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("SITE_PROCESSOR_LOG_LEVEL");
        std::env::remove_var("SITE_PROCESSOR_NATS_URL");
        std::env::remove_var("SITE_PROCESSOR_RETRY_MAX_ATTEMPTS");

        let config = SiteProcessorConfig::from_env().unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.site_events_stream, "site_events");
        assert_eq!(config.site_events_subject, "site_events.>");
        assert_eq!(config.consumer_name, "site-processor");
        assert_eq!(config.retry_max_attempts, 3);
        assert_eq!(config.breaker_window_size, 10);
        assert_eq!(config.cache_capacity, 10_000);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("SITE_PROCESSOR_LOG_LEVEL", "debug");
        std::env::set_var("SITE_PROCESSOR_NATS_URL", "nats://broker:4222");
        std::env::set_var("SITE_PROCESSOR_RETRY_MAX_ATTEMPTS", "5");

        let config = SiteProcessorConfig::from_env().unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.nats_url, "nats://broker:4222");
        assert_eq!(config.retry_max_attempts, 5);

        // Clean up
        std::env::remove_var("SITE_PROCESSOR_LOG_LEVEL");
        std::env::remove_var("SITE_PROCESSOR_NATS_URL");
        std::env::remove_var("SITE_PROCESSOR_RETRY_MAX_ATTEMPTS");
    }

    #[test]
    fn test_resilience_helpers_map_onto_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("SITE_PROCESSOR_RETRY_MAX_ATTEMPTS");
        std::env::remove_var("SITE_PROCESSOR_BREAKER_COOLDOWN_MS");

        let config = SiteProcessorConfig::from_env().unwrap();
        assert_eq!(config.retry_policy().max_attempts(), 3);

        let breaker = config.breaker_config();
        assert_eq!(breaker.window_size, 10);
        assert_eq!(breaker.open_cooldown, Duration::from_millis(30_000));
    }
}
