//! Batch orchestration: drive the dispatcher over an ordered query set.
//!
//! Every query's dispatch runs concurrently, bounded only by the one
//! limiter shared across the whole batch. Completion order is
//! concurrency-dependent; output order is not — results come back in input
//! order, one entry per query, no matter what fails along the way.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future;
use tokio::sync::Semaphore;
use tokio::time::Instant;

use crate::backend::{BackendAdapter, BackendSpec};
use crate::dispatch::{DispatchOutcomes, Dispatcher};
use crate::query::{DispatchRequest, Query};

/// Default limiter capacity for a batch run.
pub const DEFAULT_LIMITER_CAPACITY: usize = 20;

/// Observable progress side channel. Reported counts never alter results.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn on_progress(&self, completed: usize, total: usize);
}

/// Discards progress updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressSink;

#[async_trait]
impl ProgressSink for NoopProgressSink {
    async fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Logs progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgressSink;

#[async_trait]
impl ProgressSink for TracingProgressSink {
    async fn on_progress(&self, completed: usize, total: usize) {
        tracing::info!(completed, total, "batch progress");
    }
}

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Maximum in-flight backend calls across the entire batch.
    pub limiter_capacity: usize,
    /// Optional wall-clock budget; outcomes still outstanding when it
    /// expires settle as `Failed(Timeout)`.
    pub deadline: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            limiter_capacity: DEFAULT_LIMITER_CAPACITY,
            deadline: None,
        }
    }
}

/// One processed query with its per-backend outcomes.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub query: Query,
    pub outcomes: DispatchOutcomes,
}

/// Ordered batch output: `entries[i]` corresponds to the i-th input query.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run the full query collection against the enabled backends.
///
/// Exhausts the collection unconditionally: a query whose every backend
/// fails still yields a structurally complete entry rather than aborting
/// the batch.
pub async fn run_batch(
    adapter: Arc<dyn BackendAdapter>,
    queries: Vec<Query>,
    backends: &[BackendSpec],
    options: &BatchOptions,
    progress: &dyn ProgressSink,
) -> BatchResult {
    let limiter = Arc::new(Semaphore::new(options.limiter_capacity.max(1)));
    let dispatcher = Dispatcher::with_limiter(adapter, limiter);
    let deadline = options.deadline.map(|d| Instant::now() + d);

    let total = queries.len();
    let completed = AtomicUsize::new(0);

    // join_all buffers completions by future index, so input order is
    // preserved without tracking indices by hand.
    let tasks = queries.into_iter().map(|query| {
        let dispatcher = dispatcher.clone();
        let completed = &completed;
        let request = DispatchRequest::new(query, backends.to_vec());
        async move {
            let outcomes = dispatcher.dispatch_with_deadline(&request, deadline).await;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress.on_progress(done, total).await;
            BatchEntry {
                query: request.query,
                outcomes,
            }
        }
    });

    let entries = future::join_all(tasks).await;
    BatchResult { entries }
}
