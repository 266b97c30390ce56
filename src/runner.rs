//! Test execution against LLM models.
//!
//! The runner fans a test suite out across a bounded pool of concurrent
//! workers. Each worker calls the completion client, compares the response
//! against the expected value, and writes its result into a pre-allocated
//! slot at the test's original index, so the final result sequence is
//! always aligned with the input order regardless of completion order.
//!
//! A single test's failure never aborts sibling tests: every failure is
//! recorded into that test's result and the run always completes with a
//! full result set.

use crate::client::CompletionClient;
use crate::compare;
use crate::error::EvalError;
use crate::logging::log_debug;
use crate::metrics;
use crate::types::{ModelRun, TestCase, TestResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Executes test suites against models with bounded concurrency.
#[derive(Debug)]
pub struct Runner {
    client: CompletionClient,
    parallel: usize,
}

impl Runner {
    /// Create a new runner. Parallelism below 1 is clamped to 1.
    pub fn new(client: CompletionClient, parallel: usize) -> Self {
        Self {
            client,
            parallel: parallel.max(1),
        }
    }

    /// Run every test case against `model` and aggregate metrics.
    ///
    /// At most `parallel` requests are in flight at once. The run blocks
    /// until every worker has finished; metrics are computed only over the
    /// fully-populated result set. Cancellation makes in-flight workers
    /// record a cancellation error on their own result; siblings already
    /// dispatched are left to finish on their own.
    pub async fn run(
        &self,
        cancel: &CancellationToken,
        model: &str,
        prompt: &str,
        schema: &Value,
        tests: &[TestCase],
    ) -> ModelRun {
        let start = Instant::now();

        // One slot per test; each worker owns a unique index, so no lock is
        // needed for result writes.
        let mut slots: Vec<Option<TestResult>> = Vec::with_capacity(tests.len());
        slots.resize_with(tests.len(), || None);

        let semaphore = Arc::new(Semaphore::new(self.parallel));
        let model_shared: Arc<str> = Arc::from(model);
        let prompt_shared: Arc<str> = Arc::from(prompt);
        let schema_shared = Arc::new(schema.clone());
        let mut workers = JoinSet::new();

        for (idx, test) in tests.iter().cloned().enumerate() {
            let client = self.client.clone();
            let cancel = cancel.clone();
            let semaphore = Arc::clone(&semaphore);
            let model = Arc::clone(&model_shared);
            let prompt = Arc::clone(&prompt_shared);
            let schema = Arc::clone(&schema_shared);

            workers.spawn(async move {
                // Admission slot; blocks while the pool is saturated.
                let _permit = tokio::select! {
                    () = cancel.cancelled() => {
                        let mut result = TestResult::pending(&test.name, test.expected.clone());
                        result.error = Some(render_error(&EvalError::cancelled()));
                        return (idx, result);
                    }
                    permit = semaphore.acquire_owned() => {
                        permit.expect("semaphore is never closed")
                    }
                };

                let result =
                    run_single_test(&client, &cancel, &model, &prompt, &schema, &test).await;
                (idx, result)
            });
        }

        while let Some(joined) = workers.join_next().await {
            let (idx, result) = joined.expect("test worker panicked");
            slots[idx] = Some(result);
        }

        let results: Vec<TestResult> = slots
            .into_iter()
            .map(|slot| slot.expect("every slot written exactly once"))
            .collect();

        let total_duration = start.elapsed();
        let metrics = metrics::calculate(model, &results, total_duration);

        log_debug!(
            model = model,
            tests = results.len(),
            passed = metrics.passed,
            failed = metrics.failed,
            errors = metrics.errors,
            duration_ms = total_duration.as_millis() as u64,
            "Model run complete"
        );

        ModelRun {
            model: model.to_string(),
            results,
            metrics,
        }
    }
}

/// Execute a single test case against the model.
async fn run_single_test(
    client: &CompletionClient,
    cancel: &CancellationToken,
    model: &str,
    prompt: &str,
    schema: &Value,
    test: &TestCase,
) -> TestResult {
    let mut result = TestResult::pending(&test.name, test.expected.clone());

    let completion = match client
        .complete(cancel, model, prompt, &test.input, schema)
        .await
    {
        Ok(completion) => completion,
        Err(err) => {
            log_debug!(test = %test.name, error = %err, "Test errored");
            result.error = Some(render_error(&err));
            return result;
        }
    };

    result.provider = (!completion.provider.is_empty()).then_some(completion.provider);
    result.latency = completion.latency;
    result.tokens_in = completion.tokens_in;
    result.tokens_out = completion.tokens_out;

    // A response that is not valid JSON is a per-test error, distinct from
    // a structural mismatch.
    let actual: Value = match serde_json::from_str(&completion.response) {
        Ok(value) => value,
        Err(err) => {
            result.error = Some(format!("comparison error: response is not valid JSON: {err}"));
            return result;
        }
    };

    let diffs = compare::compare(&test.expected, &actual);
    result.passed = diffs.is_empty();
    result.actual = Some(actual);
    result.diffs = diffs;
    result
}

/// Render an error with its full source chain.
fn render_error(err: &EvalError) -> String {
    use std::error::Error;

    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
