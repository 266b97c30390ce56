//! Test helper utilities shared across integration tests.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use serde_json::{json, Value};
use std::time::Duration;
use verdict::{ClientConfig, CompletionClient, RetryPolicy, TestCase};

/// Fast retry policy so retry-path tests stay quick.
pub fn fast_retry_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(10),
        request_timeout: Duration::from_secs(5),
    }
}

/// Client pointed at a mock server.
pub fn test_client(base_url: &str, max_attempts: u32) -> CompletionClient {
    let config = ClientConfig::new("test-key")
        .with_base_url(base_url)
        .with_retry_policy(fast_retry_policy(max_attempts));
    CompletionClient::new(config).expect("test client config is valid")
}

/// A chat-completion response body whose first choice carries `content`
/// serialized as a JSON string.
pub fn chat_body(content: &Value, tokens_in: u32, tokens_out: u32) -> Value {
    chat_body_raw(&content.to_string(), tokens_in, tokens_out)
}

/// A chat-completion response body with verbatim choice content.
pub fn chat_body_raw(content: &str, tokens_in: u32, tokens_out: u32) -> Value {
    json!({
        "id": "gen-123",
        "model": "test/model",
        "provider": "TestProvider",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content}
        }],
        "usage": {"prompt_tokens": tokens_in, "completion_tokens": tokens_out}
    })
}

pub fn test_case(name: &str, input: &str, expected: Value) -> TestCase {
    TestCase {
        name: name.to_string(),
        input: input.to_string(),
        expected,
    }
}

/// A small schema fixture; its content is opaque to the client.
pub fn entity_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"name": {"type": "string"}},
        "required": ["name"],
        "additionalProperties": false
    })
}
