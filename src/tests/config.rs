// Unit tests for client configuration

use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::EvalError;
use std::time::Duration;

#[test]
fn new_config_uses_openrouter_defaults() {
    let config = ClientConfig::new("key");

    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.retry_policy.max_attempts, 3);
}

#[test]
fn builders_override_defaults() {
    let config = ClientConfig::new("key")
        .with_base_url("http://localhost:8080")
        .with_retry_policy(crate::retry::RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            request_timeout: Duration::from_secs(5),
        });

    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.retry_policy.max_attempts, 1);
}

#[test]
fn empty_api_key_fails_validation() {
    let result = ClientConfig::new("").validate();

    match result {
        Err(EvalError::ConfigurationError { message }) => {
            assert!(message.contains("API key"));
        }
        other => panic!("Expected ConfigurationError, got: {other:?}"),
    }
}
