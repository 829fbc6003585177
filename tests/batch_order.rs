use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use acrobench::backend::{BackendAdapter, BackendError, BackendSpec};
use acrobench::batch::{run_batch, BatchOptions, NoopProgressSink, ProgressSink};
use acrobench::query::{BackendOutcome, FailureKind, Query};
use async_trait::async_trait;

/// Replies with a mapping naming the query, after a per-query jitter delay
/// derived from the query text, so completion order differs from input
/// order.
struct JitterAdapter {
    calls: AtomicUsize,
}

impl JitterAdapter {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendAdapter for JitterAdapter {
    async fn invoke(&self, _spec: BackendSpec, query: &Query) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let index: u64 = query.text.trim_start_matches('q').parse().unwrap_or(0);
        // Later queries finish earlier: completion order is the reverse of
        // input order.
        let jitter = Duration::from_millis(100u64.saturating_sub(index * 7));
        tokio::time::sleep(jitter).await;
        Ok(format!(r#"{{"echo": ["{}"]}}"#, query.text))
    }
}

fn echoed(outcome: &BackendOutcome) -> &str {
    match outcome {
        BackendOutcome::Structured(map) => map["echo"][0].as_str().unwrap(),
        other => panic!("expected Structured, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn batch_output_order_matches_input_order_under_jitter() {
    let adapter = JitterAdapter::new();
    let queries: Vec<Query> = (0..10).map(|i| Query::bare(format!("q{i}"))).collect();
    let backends = [BackendSpec::QwenBase];

    let options = BatchOptions {
        limiter_capacity: 2,
        deadline: None,
    };
    let result = run_batch(
        adapter.clone(),
        queries.clone(),
        &backends,
        &options,
        &NoopProgressSink,
    )
    .await;

    assert_eq!(result.len(), 10);
    for (i, entry) in result.entries.iter().enumerate() {
        assert_eq!(entry.query.text, format!("q{i}"), "entry {i} out of order");
        assert_eq!(entry.outcomes.len(), 1);
        assert_eq!(echoed(&entry.outcomes[&BackendSpec::QwenBase]), format!("q{i}"));
    }
}

#[tokio::test(start_paused = true)]
async fn zero_candidate_queries_are_still_dispatched_to_every_backend() {
    let adapter = JitterAdapter::new();
    let queries: Vec<Query> = (0..4).map(|i| Query::bare(format!("q{i}"))).collect();
    let backends = [BackendSpec::QwenBase, BackendSpec::QwenLora];

    let result = run_batch(
        adapter.clone(),
        queries,
        &backends,
        &BatchOptions::default(),
        &NoopProgressSink,
    )
    .await;

    assert_eq!(result.len(), 4);
    assert_eq!(adapter.calls(), 4 * 2);
}

#[derive(Default)]
struct RecordingProgress {
    updates: Mutex<Vec<(usize, usize)>>,
}

#[async_trait]
impl ProgressSink for RecordingProgress {
    async fn on_progress(&self, completed: usize, total: usize) {
        self.updates.lock().unwrap().push((completed, total));
    }
}

#[tokio::test(start_paused = true)]
async fn progress_reports_every_completion_out_of_total() {
    let adapter = JitterAdapter::new();
    let queries: Vec<Query> = (0..6).map(|i| Query::bare(format!("q{i}"))).collect();
    let progress = RecordingProgress::default();

    run_batch(
        adapter,
        queries,
        &[BackendSpec::QwenBase],
        &BatchOptions {
            limiter_capacity: 3,
            deadline: None,
        },
        &progress,
    )
    .await;

    let mut updates = progress.updates.lock().unwrap().clone();
    assert_eq!(updates.len(), 6);
    assert!(updates.iter().all(|&(_, total)| total == 6));
    updates.sort();
    let counts: Vec<usize> = updates.into_iter().map(|(done, _)| done).collect();
    assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
}

/// Always takes 100ms per call.
struct SlowAdapter;

#[async_trait]
impl BackendAdapter for SlowAdapter {
    async fn invoke(&self, _spec: BackendSpec, _query: &Query) -> Result<String, BackendError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok("{}".to_string())
    }
}

#[tokio::test(start_paused = true)]
async fn batch_deadline_marks_outstanding_outcomes_as_timeout() {
    let queries: Vec<Query> = (0..5).map(|i| Query::bare(format!("q{i}"))).collect();
    let options = BatchOptions {
        limiter_capacity: 1,
        deadline: Some(Duration::from_millis(250)),
    };

    let result = run_batch(
        Arc::new(SlowAdapter),
        queries,
        &[BackendSpec::QwenBase],
        &options,
        &NoopProgressSink,
    )
    .await;

    // Every slot is populated even though the deadline fired mid-batch.
    assert_eq!(result.len(), 5);
    let timeouts = result
        .entries
        .iter()
        .filter(|e| {
            matches!(
                e.outcomes[&BackendSpec::QwenBase],
                BackendOutcome::Failed {
                    kind: FailureKind::Timeout,
                    ..
                }
            )
        })
        .count();
    let successes = result
        .entries
        .iter()
        .filter(|e| matches!(e.outcomes[&BackendSpec::QwenBase], BackendOutcome::Structured(_)))
        .count();

    assert_eq!(timeouts + successes, 5);
    assert!(successes >= 1, "expected early queries to finish before the deadline");
    assert!(timeouts >= 2, "expected late queries to hit the deadline");
}
