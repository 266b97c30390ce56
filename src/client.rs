//! HTTP client for the OpenRouter chat-completion API.
//!
//! One structured-output completion request per test case, with linear
//! backoff retry on transient failure. The caller-supplied schema is passed
//! through opaquely; conformance is enforced server-side.

use crate::config::ClientConfig;
use crate::error::{EvalError, EvalResult};
use crate::logging::log_debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// A chat message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Structured-output directive wrapping a JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String, // "json_schema"
    pub json_schema: JsonSchemaSpec,
}

/// Named schema blob with strict conformance enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub strict: bool,
    pub schema: Value,
}

/// Chat completion request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Chat completion response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    /// Upstream provider that served the request.
    #[serde(default)]
    pub provider: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Usage,
}

/// A single completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
}

/// Token usage for a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// The outcome of a successful completion request.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Raw content of the first choice, expected to be a JSON document.
    /// Not validated against the schema here.
    pub response: String,
    /// Upstream provider that served the request.
    pub provider: String,
    /// Prompt token count.
    pub tokens_in: u32,
    /// Completion token count.
    pub tokens_out: u32,
    /// Wall-clock time from request send to response fully read.
    pub latency: Duration,
}

/// Client for the OpenRouter chat-completion endpoint.
///
/// Holds only immutable configuration and a connection pool; it is cheap to
/// clone and safe to share across concurrent workers.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl CompletionClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::ConfigurationError`] if the API key is missing
    /// or the HTTP client cannot be initialized.
    pub fn new(config: ClientConfig) -> EvalResult<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.retry_policy.request_timeout)
            .build()
            .map_err(|e| {
                EvalError::configuration_error(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { http, config })
    }

    /// Send a structured-output completion request for one test input.
    ///
    /// Retries up to the configured attempt limit with linear backoff.
    /// Cancellation observed during the network call or a backoff wait
    /// fails immediately with [`EvalError::Cancelled`] and is never retried.
    pub async fn complete(
        &self,
        cancel: &CancellationToken,
        model: &str,
        system_prompt: &str,
        user_input: &str,
        schema: &Value,
    ) -> EvalResult<Completion> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_input.to_string(),
                },
            ],
            response_format: Some(ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaSpec {
                    name: "response".to_string(),
                    strict: true,
                    schema: schema.clone(),
                },
            }),
        };

        let headers = self.build_headers()?;
        let max_attempts = self.config.retry_policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                let delay = self.config.retry_policy.delay(attempt - 1);
                log_debug!(
                    model = model,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Request failed, retrying after delay"
                );
                tokio::select! {
                    () = cancel.cancelled() => return Err(EvalError::cancelled()),
                    () = sleep(delay) => {}
                }
            }

            match self.send_request(cancel, &headers, &request).await {
                Ok(completion) => return Ok(completion),
                Err(EvalError::Cancelled) => return Err(EvalError::Cancelled),
                Err(err) => last_error = Some(err),
            }
        }

        let last = last_error
            .unwrap_or_else(|| EvalError::request_failed("maximum attempts exceeded", None));
        Err(EvalError::retries_exhausted(max_attempts, last))
    }

    fn build_headers(&self) -> EvalResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(|e| EvalError::configuration_error(format!("invalid API key: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "http-referer",
            HeaderValue::from_static("https://github.com/verdict-cli/verdict"),
        );
        headers.insert("x-title", HeaderValue::from_static("Verdict CLI"));
        Ok(headers)
    }

    /// One attempt, racing the network call against cancellation.
    async fn send_request(
        &self,
        cancel: &CancellationToken,
        headers: &HeaderMap,
        request: &ChatRequest,
    ) -> EvalResult<Completion> {
        tokio::select! {
            () = cancel.cancelled() => Err(EvalError::cancelled()),
            result = self.dispatch(headers, request) => result,
        }
    }

    async fn dispatch(&self, headers: &HeaderMap, request: &ChatRequest) -> EvalResult<Completion> {
        let url = format!("{}/chat/completions", self.config.base_url);

        let start = Instant::now();
        let response = self
            .http
            .post(&url)
            .headers(headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let message = e.to_string();
                EvalError::request_failed(message, Some(Box::new(e)))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let message = format!("failed to read response body: {e}");
            EvalError::request_failed(message, Some(Box::new(e)))
        })?;
        let latency = start.elapsed();

        if !status.is_success() {
            return Err(EvalError::request_failed(
                format!("API error (status {}): {}", status.as_u16(), body),
                None,
            ));
        }

        let chat: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| EvalError::response_parsing_error(format!("invalid response body: {e}")))?;

        let Some(choice) = chat.choices.into_iter().next() else {
            return Err(EvalError::response_parsing_error("no choices in response"));
        };

        log_debug!(
            model = %chat.model,
            provider = %chat.provider,
            prompt_tokens = chat.usage.prompt_tokens,
            completion_tokens = chat.usage.completion_tokens,
            latency_ms = latency.as_millis() as u64,
            "Completion received"
        );

        Ok(Completion {
            response: choice.message.content,
            provider: chat.provider,
            tokens_in: chat.usage.prompt_tokens,
            tokens_out: chat.usage.completion_tokens,
            latency,
        })
    }
}
