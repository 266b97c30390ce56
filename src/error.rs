//! Error types for evaluation runs.
//!
//! The main error type is [`EvalError`], which covers all failure modes:
//! - Configuration errors (missing credentials, unreadable input files)
//! - Request failures (network issues, non-2xx API responses)
//! - Response parsing failures (malformed bodies, empty choice lists)
//! - Cancellation (operator interrupt)
//! - Retry exhaustion (wrapping the last underlying failure)
//!
//! Per-test failures never abort a run: the runner stores the rendered
//! error string into that test's result and continues. Only cancellation
//! and configuration errors affect control flow beyond a single test.
//!
//! Use [`EvalResult<T>`] as a convenient alias for `Result<T, EvalError>`.

use crate::logging::{log_error, log_warn};
use thiserror::Error;

/// Convenient result type for evaluation operations.
pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Errors that can occur while running an evaluation.
///
/// Each variant can be checked for retryability via
/// [`is_retryable()`](Self::is_retryable), which drives the completion
/// client's retry loop.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Configuration is invalid or incomplete.
    ///
    /// Common causes:
    /// - Missing API key
    /// - Unreadable test or schema file
    /// - Invalid JSON in an input file
    #[error("configuration error: {message}")]
    ConfigurationError {
        /// Description of the configuration problem.
        message: String,
    },

    /// The HTTP request to the API failed.
    ///
    /// Covers connection errors and non-2xx responses. Retryable.
    #[error("request failed: {message}")]
    RequestFailed {
        /// Description of the failure.
        message: String,
        /// The underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The API returned a response that could not be used.
    ///
    /// Covers malformed JSON bodies and responses with no choices.
    /// Retryable: a garbled response is treated like any other transient
    /// API failure.
    #[error("response parsing failed: {message}")]
    ResponseParsingError {
        /// Details about the parsing failure.
        message: String,
    },

    /// The operation was cancelled by the caller.
    ///
    /// Never retried; aborts any backoff wait in progress.
    #[error("operation cancelled")]
    Cancelled,

    /// All retry attempts were exhausted.
    ///
    /// Wraps the error from the final attempt.
    #[error("failed after {attempts} attempts")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// Whether this error is transient and should trigger a retry.
    ///
    /// Cancellation is never retried. Configuration errors and retry
    /// exhaustion are terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RequestFailed { .. } | Self::ResponseParsingError { .. }
        )
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn configuration_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "configuration_error",
            message = %message,
            "Configuration validation failed"
        );
        Self::ConfigurationError { message }
    }

    pub fn request_failed(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "request_failed",
            message = %message,
            has_source = source.is_some(),
            "Completion request failed"
        );
        Self::RequestFailed { message, source }
    }

    pub fn response_parsing_error(message: impl Into<String>) -> Self {
        let message = message.into();
        log_warn!(
            error_type = "response_parsing_error",
            message = %message,
            "Completion response format invalid"
        );
        Self::ResponseParsingError { message }
    }

    pub fn cancelled() -> Self {
        log_warn!(error_type = "cancelled", "Operation cancelled by caller");
        Self::Cancelled
    }

    pub fn retries_exhausted(attempts: u32, source: EvalError) -> Self {
        log_error!(
            error_type = "retries_exhausted",
            attempts = attempts,
            last_error = %source,
            "Request failed after all retry attempts"
        );
        Self::RetriesExhausted {
            attempts,
            source: Box::new(source),
        }
    }
}
