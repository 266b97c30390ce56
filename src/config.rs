//! Client and runner configuration.
//!
//! Configuration is explicit: values are constructed by the caller and
//! passed into [`CompletionClient::new`](crate::client::CompletionClient::new)
//! and [`Runner::new`](crate::runner::Runner::new). There is no process-wide
//! configuration state.

use crate::error::{EvalError, EvalResult};
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};

/// Default OpenRouter API base URL.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Configuration for the OpenRouter completion client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Bearer credential for the API.
    pub api_key: String,
    /// API base URL, overridable for testing.
    pub base_url: String,
    /// Retry behavior for completion requests.
    pub retry_policy: RetryPolicy,
}

impl ClientConfig {
    /// Create a configuration with the default base URL and retry policy.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Override the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Validate the configuration is complete.
    pub fn validate(&self) -> EvalResult<()> {
        if self.api_key.is_empty() {
            return Err(EvalError::configuration_error("API key is required"));
        }
        Ok(())
    }
}
