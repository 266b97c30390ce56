//! Integration tests for the concurrent runner
//!
//! UNIT UNDER TEST: Runner
//!
//! BUSINESS RESPONSIBILITY:
//!   - Fan a test suite out across a bounded pool of workers
//!   - Keep results index-aligned with the input suite
//!   - Contain per-test failures without aborting sibling tests
//!   - Aggregate metrics only once every worker has finished
//!
//! TEST COVERAGE:
//!   - Result ordering under reversed response latencies
//!   - Concurrency cap observed via a counting responder
//!   - Error containment for persistent failures and unparseable responses
//!   - Accuracy arithmetic over mixed pass/fail results
//!   - Cancellation recorded per-test while the run still completes

mod common;

use common::{chat_body, chat_body_raw, entity_schema, test_case, test_client};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use verdict::Runner;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

#[tokio::test]
async fn test_result_order_matches_input_order_with_reversed_latencies() {
    let mock_server = MockServer::start().await;

    // The first test gets the slowest response so completion order is the
    // reverse of input order.
    for (input, delay_ms) in [("input-slow", 300u64), ("input-mid", 150), ("input-fast", 10)] {
        let content = json!({"id": input});
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_string_contains(input))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body(&content, 5, 5))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .mount(&mock_server)
            .await;
    }

    let tests = vec![
        test_case("slow", "input-slow", json!({"id": "input-slow"})),
        test_case("mid", "input-mid", json!({"id": "input-mid"})),
        test_case("fast", "input-fast", json!({"id": "input-fast"})),
    ];

    let runner = Runner::new(test_client(&mock_server.uri(), 1), 3);
    let run = runner
        .run(
            &CancellationToken::new(),
            "test/model",
            "You are a test.",
            &entity_schema(),
            &tests,
        )
        .await;

    let names: Vec<&str> = run.results.iter().map(|r| r.test_name.as_str()).collect();
    assert_eq!(names, vec!["slow", "mid", "fast"]);
    assert!(run.results.iter().all(|r| r.passed), "{:?}", run.results);
    assert_eq!(run.metrics.passed, 3);
}

/// Responder that records the span each request occupies, so the test can
/// compute how many requests were in flight simultaneously.
struct ConcurrencyProbe {
    delay: Duration,
    spans: Arc<Mutex<Vec<(Instant, Instant)>>>,
    body: serde_json::Value,
}

impl Respond for ConcurrencyProbe {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let now = Instant::now();
        self.spans
            .lock()
            .expect("span lock poisoned")
            .push((now, now + self.delay));
        ResponseTemplate::new(200)
            .set_body_json(&self.body)
            .set_delay(self.delay)
    }
}

fn max_overlap(spans: &[(Instant, Instant)]) -> usize {
    let mut events: Vec<(Instant, i32)> = Vec::new();
    for (start, end) in spans {
        events.push((*start, 1));
        events.push((*end, -1));
    }
    // Ends sort before starts at the same instant.
    events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut current = 0i32;
    let mut max = 0i32;
    for (_, delta) in events {
        current += delta;
        max = max.max(current);
    }
    max as usize
}

#[tokio::test]
async fn test_no_more_than_parallel_requests_in_flight() {
    let mock_server = MockServer::start().await;
    let spans = Arc::new(Mutex::new(Vec::new()));

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ConcurrencyProbe {
            delay: Duration::from_millis(150),
            spans: Arc::clone(&spans),
            body: chat_body(&json!({"ok": true}), 2, 2),
        })
        .expect(6)
        .mount(&mock_server)
        .await;

    let tests: Vec<_> = (0..6)
        .map(|i| test_case(&format!("case-{i}"), &format!("input-{i}"), json!({"ok": true})))
        .collect();

    let parallel = 2;
    let runner = Runner::new(test_client(&mock_server.uri(), 1), parallel);
    let run = runner
        .run(
            &CancellationToken::new(),
            "test/model",
            "You are a test.",
            &entity_schema(),
            &tests,
        )
        .await;

    assert_eq!(run.results.len(), 6);
    assert!(run.results.iter().all(|r| r.passed));

    let spans = spans.lock().expect("span lock poisoned");
    let observed = max_overlap(&spans);
    assert!(
        observed <= parallel,
        "observed {observed} concurrent requests with parallelism {parallel}"
    );
    assert!(observed > 1, "parallel run should actually overlap requests");
}

#[tokio::test]
async fn test_persistent_failure_is_contained_to_its_own_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("input-bad"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&json!({"ok": true}), 2, 2)))
        .mount(&mock_server)
        .await;

    let tests = vec![
        test_case("good-1", "input-good-1", json!({"ok": true})),
        test_case("bad", "input-bad", json!({"ok": true})),
        test_case("good-2", "input-good-2", json!({"ok": true})),
    ];

    let runner = Runner::new(test_client(&mock_server.uri(), 2), 2);
    let run = runner
        .run(
            &CancellationToken::new(),
            "test/model",
            "You are a test.",
            &entity_schema(),
            &tests,
        )
        .await;

    let bad = &run.results[1];
    assert!(!bad.passed);
    let error = bad.error.as_deref().expect("failing test records its error");
    assert!(error.contains("failed after 2 attempts"), "got: {error}");
    assert!(
        bad.diffs.is_empty(),
        "an errored test never carries diffs: {:?}",
        bad.diffs
    );

    assert!(run.results[0].passed);
    assert!(run.results[2].passed);
    assert_eq!(run.metrics.passed, 2);
    assert_eq!(run.metrics.errors, 1);
    assert_eq!(run.metrics.failed, 0);
}

#[tokio::test]
async fn test_accuracy_over_mixed_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("input-bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&json!({"ok": false}), 3, 3)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&json!({"ok": true}), 3, 3)))
        .mount(&mock_server)
        .await;

    let mut tests = Vec::new();
    for i in 0..7 {
        tests.push(test_case(
            &format!("good-{i}"),
            &format!("input-good-{i}"),
            json!({"ok": true}),
        ));
    }
    for i in 0..3 {
        tests.push(test_case(
            &format!("bad-{i}"),
            &format!("input-bad-{i}"),
            json!({"ok": true}),
        ));
    }

    let runner = Runner::new(test_client(&mock_server.uri(), 1), 4);
    let run = runner
        .run(
            &CancellationToken::new(),
            "test/model",
            "You are a test.",
            &entity_schema(),
            &tests,
        )
        .await;

    assert_eq!(run.metrics.total_tests, 10);
    assert_eq!(run.metrics.passed, 7);
    assert_eq!(run.metrics.failed, 3);
    assert_eq!(run.metrics.errors, 0);
    assert_eq!(run.metrics.accuracy, 70.0);
    assert_eq!(run.metrics.total_tokens_in, 30);
    assert_eq!(run.metrics.total_tokens_out, 30);

    for result in run.results.iter().filter(|r| !r.passed) {
        assert!(result.error.is_none(), "a mismatch is not an error");
        assert_eq!(result.diffs.len(), 1);
        assert_eq!(result.diffs[0].path, "ok");
    }
}

#[tokio::test]
async fn test_unparseable_response_is_a_per_test_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body_raw("not json {{", 4, 2)))
        .mount(&mock_server)
        .await;

    let tests = vec![test_case("garbled", "input-1", json!({"ok": true}))];

    let runner = Runner::new(test_client(&mock_server.uri(), 1), 1);
    let run = runner
        .run(
            &CancellationToken::new(),
            "test/model",
            "You are a test.",
            &entity_schema(),
            &tests,
        )
        .await;

    let result = &run.results[0];
    assert!(!result.passed);
    let error = result.error.as_deref().expect("parse failure is recorded");
    assert!(error.contains("comparison error"), "got: {error}");
    assert!(result.diffs.is_empty());
    assert!(result.actual.is_none());
    // The completion itself succeeded, so its usage is still recorded.
    assert_eq!(result.tokens_in, 4);
    assert_eq!(result.tokens_out, 2);
    assert_eq!(run.metrics.errors, 1);
}

#[tokio::test]
async fn test_cancelled_run_records_errors_but_still_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&json!({}), 1, 1)))
        .mount(&mock_server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let tests = vec![
        test_case("a", "input-a", json!({})),
        test_case("b", "input-b", json!({})),
        test_case("c", "input-c", json!({})),
    ];

    let runner = Runner::new(test_client(&mock_server.uri(), 3), 1);
    let run = runner
        .run(&cancel, "test/model", "You are a test.", &entity_schema(), &tests)
        .await;

    assert_eq!(run.results.len(), 3, "cancelled run still yields a full result set");
    for result in &run.results {
        assert!(!result.passed);
        let error = result.error.as_deref().expect("cancellation is recorded per test");
        assert!(error.contains("cancelled"), "got: {error}");
    }
    assert_eq!(run.metrics.errors, 3);
}

#[tokio::test]
async fn test_parallelism_below_one_is_clamped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_body(&json!({"ok": true}), 1, 1)))
        .mount(&mock_server)
        .await;

    let tests = vec![
        test_case("a", "input-a", json!({"ok": true})),
        test_case("b", "input-b", json!({"ok": true})),
    ];

    let runner = Runner::new(test_client(&mock_server.uri(), 1), 0);
    let run = runner
        .run(
            &CancellationToken::new(),
            "test/model",
            "You are a test.",
            &entity_schema(),
            &tests,
        )
        .await;

    assert_eq!(run.metrics.passed, 2);
}
