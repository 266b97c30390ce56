//! Aggregation of per-test results into model-level metrics.
//!
//! [`calculate`] is a pure batch reduction over a completed result set; it
//! is recomputed from scratch for every run and never updated incrementally.

use crate::types::{ModelMetrics, TestResult};
use std::time::Duration;

/// Compute aggregated metrics for a completed model run.
///
/// Counting: a result with an error counts as an error even if diffs are
/// empty; `failed` is everything that neither passed nor errored. Latency
/// percentiles only sample results that report a positive latency, so
/// requests that errored before a response contribute nothing.
pub fn calculate(model: &str, results: &[TestResult], total_duration: Duration) -> ModelMetrics {
    let mut metrics = ModelMetrics {
        model: model.to_string(),
        total_tests: results.len(),
        passed: 0,
        failed: 0,
        errors: 0,
        accuracy: 0.0,
        total_tokens_in: 0,
        total_tokens_out: 0,
        latency_p50: Duration::ZERO,
        latency_p95: Duration::ZERO,
        latency_p99: Duration::ZERO,
        total_duration,
        throughput: 0.0,
    };

    let mut latencies = Vec::new();

    for result in results {
        if result.error.is_some() {
            metrics.errors += 1;
        } else if result.passed {
            metrics.passed += 1;
        } else {
            metrics.failed += 1;
        }

        metrics.total_tokens_in += u64::from(result.tokens_in);
        metrics.total_tokens_out += u64::from(result.tokens_out);

        if result.latency > Duration::ZERO {
            latencies.push(result.latency);
        }
    }

    if metrics.total_tests > 0 {
        metrics.accuracy = metrics.passed as f64 / metrics.total_tests as f64 * 100.0;
    }

    if total_duration > Duration::ZERO {
        metrics.throughput = metrics.total_tokens_out as f64 / total_duration.as_secs_f64();
    }

    if !latencies.is_empty() {
        latencies.sort();
        metrics.latency_p50 = percentile(&latencies, 50.0);
        metrics.latency_p95 = percentile(&latencies, 95.0);
        metrics.latency_p99 = percentile(&latencies, 99.0);
    }

    metrics
}

/// The p-th percentile of an ascending-sorted sample set, by linear
/// interpolation at fractional rank `p/100 * (n-1)`.
pub(crate) fn percentile(sorted: &[Duration], p: f64) -> Duration {
    match sorted {
        [] => Duration::ZERO,
        [only] => *only,
        _ => {
            let rank = p / 100.0 * (sorted.len() - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = lower + 1;
            if upper >= sorted.len() {
                return sorted[sorted.len() - 1];
            }
            let weight = rank - lower as f64;
            let interpolated = sorted[lower].as_secs_f64() * (1.0 - weight)
                + sorted[upper].as_secs_f64() * weight;
            Duration::from_secs_f64(interpolated)
        }
    }
}
