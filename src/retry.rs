//! Retry policy for completion requests.
//!
//! Requests are retried with linear backoff: the wait before retry `n`
//! (counting completed attempts) is `n * base_delay`, so with the default
//! one second base the waits are 1s, 2s, and so on.

use std::time::Duration;

/// Retry policy configuration for completion requests.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts per request (first try included).
    pub max_attempts: u32,
    /// Base delay unit for linear backoff.
    pub base_delay: Duration,
    /// Timeout for a single HTTP request.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after `completed_attempts` failed attempts.
    ///
    /// Linear: `completed_attempts * base_delay`.
    pub fn delay(&self, completed_attempts: u32) -> Duration {
        self.base_delay * completed_attempts
    }
}
