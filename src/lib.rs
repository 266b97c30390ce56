//! # verdict
//!
//! Specification testing for structured LLM outputs via OpenRouter.
//!
//! ## Key Features
//!
//! - **Test suites**: input strings paired with expected JSON outputs
//! - **Structured output**: completions constrained by a caller-supplied JSON schema
//! - **Field-level diffs**: every mismatch located by path
//! - **Bounded parallelism**: concurrent requests with results in input order
//! - **Metrics**: accuracy, token totals, latency percentiles, throughput
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tokio_util::sync::CancellationToken;
//! use verdict::{ClientConfig, CompletionClient, Runner};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = CompletionClient::new(ClientConfig::new("your-api-key"))?;
//! let runner = Runner::new(client, 4);
//!
//! let tests = verdict::suite::load_tests(Path::new("tests.json"))?;
//! let schema = verdict::suite::load_schema(Path::new("schema.json"))?;
//!
//! let run = runner
//!     .run(
//!         &CancellationToken::new(),
//!         "openai/gpt-4o",
//!         "Extract the entities mentioned in the input.",
//!         &schema,
//!         &tests,
//!     )
//!     .await;
//! println!("accuracy: {:.1}%", run.metrics.accuracy);
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

pub mod buildinfo;
pub mod cli;
pub mod client;
pub mod compare;
pub mod config;
pub mod error;
pub mod metrics;
pub mod report;
pub mod retry;
pub mod runner;
pub mod suite;
pub mod types;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;
pub(crate) mod util;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use client::{Completion, CompletionClient};
pub use config::ClientConfig;
pub use error::{EvalError, EvalResult};
pub use retry::RetryPolicy;
pub use runner::Runner;
pub use types::{FieldDiff, ModelMetrics, ModelRun, RunReport, TestCase, TestResult};
