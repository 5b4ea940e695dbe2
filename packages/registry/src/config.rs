use std::time::Duration;

use crate::error::{RegistryError, Result};

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub retry: RetryPolicy,
}

impl RegistryConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| RegistryError::Config("DATABASE_URL not set".into()))?;

        let max_connections = env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(5);

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: env_parse("ALLOCATION_MAX_ATTEMPTS")
                .unwrap_or(defaults.max_attempts)
                .max(1),
            base_backoff: env_parse("ALLOCATION_RETRY_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_backoff),
            max_backoff: env_parse("ALLOCATION_MAX_BACKOFF_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_backoff),
        };

        Ok(Self {
            database_url,
            max_connections,
            retry,
        })
    }

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: 5,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

/// How often and how patiently to retry when a freshly computed number is
/// taken by a concurrent writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, base: Duration, max: Duration) -> Self {
        self.base_backoff = base;
        self.max_backoff = max.max(base);
        self
    }

    /// Delay before retry number `attempt` (1-based): doubles each time,
    /// capped at `max_backoff`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}
