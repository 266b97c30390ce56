//! Shared result and report types.
//!
//! These structures flow from the runner through the metrics aggregator to
//! the reporting layer. They are created once per run and handed off
//! immutably; no component downstream of the runner mutates them.
//!
//! Durations serialize as integer nanoseconds under `*_ns` keys so the JSON
//! report is stable and language-neutral.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A single test case from the input suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    /// Name of the test case.
    pub name: String,
    /// Input prompt text for the test case.
    pub input: String,
    /// Expected structured output.
    pub expected: Value,
}

/// A difference found at a specific field path.
///
/// `None` on a side means the field is absent there: a missing or extra
/// object key, an array index beyond one side's length, or a JSON `null`
/// opposite a concrete value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    /// Path to the field that differs. Dot-separated object keys with
    /// bracketed array indices; `(root)` for the document root.
    pub path: String,
    /// Expected value at this path, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    /// Actual value at this path, if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

/// The result of running a single test case.
///
/// Exactly one of {successful comparison, error} holds: a populated `error`
/// implies `diffs` is empty, and `passed` is true iff `error` is `None` and
/// `diffs` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    /// Name of the test case.
    pub test_name: String,
    /// Whether the actual output matched the expected output.
    pub passed: bool,
    /// Expected structured output.
    pub expected: Value,
    /// Actual output returned by the model, when a parseable response
    /// was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    /// Field-level differences between expected and actual output.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub diffs: Vec<FieldDiff>,
    /// Error message if the test could not be evaluated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Upstream provider that served the completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Wall-clock latency of the completion request.
    #[serde(rename = "latency_ns", with = "duration_ns")]
    pub latency: Duration,
    /// Prompt token count.
    pub tokens_in: u32,
    /// Completion token count.
    pub tokens_out: u32,
}

impl TestResult {
    /// A result shell for a test that has not completed.
    pub(crate) fn pending(test_name: impl Into<String>, expected: Value) -> Self {
        Self {
            test_name: test_name.into(),
            passed: false,
            expected,
            actual: None,
            diffs: Vec::new(),
            error: None,
            provider: None,
            latency: Duration::ZERO,
            tokens_in: 0,
            tokens_out: 0,
        }
    }
}

/// Aggregated metrics for a single model run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Model identifier.
    pub model: String,
    /// Total number of test cases.
    pub total_tests: usize,
    /// Number of tests that passed.
    pub passed: usize,
    /// Number of tests that failed comparison.
    pub failed: usize,
    /// Number of tests that errored before comparison.
    pub errors: usize,
    /// Pass percentage over all tests.
    pub accuracy: f64,
    /// Total prompt tokens across all tests.
    pub total_tokens_in: u64,
    /// Total completion tokens across all tests.
    pub total_tokens_out: u64,
    /// 50th percentile completion latency.
    #[serde(rename = "latency_p50_ns", with = "duration_ns")]
    pub latency_p50: Duration,
    /// 95th percentile completion latency.
    #[serde(rename = "latency_p95_ns", with = "duration_ns")]
    pub latency_p95: Duration,
    /// 99th percentile completion latency.
    #[serde(rename = "latency_p99_ns", with = "duration_ns")]
    pub latency_p99: Duration,
    /// Wall-clock duration of the whole run.
    #[serde(rename = "total_duration_ns", with = "duration_ns")]
    pub total_duration: Duration,
    /// Completion tokens per second of wall-clock time.
    #[serde(rename = "throughput_tps")]
    pub throughput: f64,
}

/// All results from running a test suite against a single model.
///
/// `results` is index-aligned with the input test sequence regardless of
/// completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRun {
    /// Model identifier.
    pub model: String,
    /// Per-test results, in input order.
    pub results: Vec<TestResult>,
    /// Aggregated metrics.
    pub metrics: ModelMetrics,
}

/// The complete output of one invocation across all models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started.
    pub timestamp: DateTime<Utc>,
    /// System prompt, truncated for display.
    pub prompt: String,
    /// Path of the schema file used.
    #[serde(rename = "schema_file")]
    pub schema: String,
    /// Path of the test suite file used.
    pub test_file: String,
    /// One entry per model tested, in invocation order.
    pub models: Vec<ModelRun>,
}

/// Serialize a `Duration` as integer nanoseconds.
mod duration_ns {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(d.as_nanos() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}
