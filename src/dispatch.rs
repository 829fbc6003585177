//! Bounded multi-backend dispatch for a single query.
//!
//! One concurrent task per enabled backend, all sharing a single
//! [`Semaphore`] that caps in-flight backend calls across the whole system,
//! not just one request. Tasks settle independently: a slow or failing
//! backend never blocks, cancels, or contaminates its siblings, and every
//! enabled backend ends up with exactly one outcome.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future;
use tokio::sync::Semaphore;
use tokio::time::Instant;
use tracing::warn;

use crate::backend::{BackendAdapter, BackendSpec};
use crate::normalize;
use crate::query::{BackendOutcome, DispatchRequest, FailureKind, Query};

/// Per-backend outcomes for one dispatch, in canonical backend order.
pub type DispatchOutcomes = BTreeMap<BackendSpec, BackendOutcome>;

/// Fans one query out to its enabled backends under the shared limiter.
#[derive(Clone)]
pub struct Dispatcher {
    adapter: Arc<dyn BackendAdapter>,
    limiter: Arc<Semaphore>,
}

impl Dispatcher {
    /// Dispatcher with a fresh limiter admitting `capacity` concurrent
    /// backend calls.
    pub fn new(adapter: Arc<dyn BackendAdapter>, capacity: usize) -> Self {
        Self::with_limiter(adapter, Arc::new(Semaphore::new(capacity)))
    }

    /// Dispatcher sharing an existing limiter (one batch, one limiter).
    pub fn with_limiter(adapter: Arc<dyn BackendAdapter>, limiter: Arc<Semaphore>) -> Self {
        Self { adapter, limiter }
    }

    pub fn limiter(&self) -> Arc<Semaphore> {
        self.limiter.clone()
    }

    /// Issue one call per enabled backend and wait for all of them to
    /// settle. No retries, no short-circuit on failure; zero-candidate
    /// queries are dispatched like any other, uniformly for every backend.
    pub async fn dispatch(&self, request: &DispatchRequest) -> DispatchOutcomes {
        self.dispatch_with_deadline(request, None).await
    }

    /// As [`dispatch`](Self::dispatch), but calls still outstanding at the
    /// deadline settle as `Failed(Timeout)` instead of hanging.
    pub async fn dispatch_with_deadline(
        &self,
        request: &DispatchRequest,
        deadline: Option<Instant>,
    ) -> DispatchOutcomes {
        let tasks = request.backends.iter().map(|&spec| {
            let adapter = self.adapter.clone();
            let limiter = self.limiter.clone();
            let query = &request.query;
            async move {
                let outcome = call_one(adapter, limiter, spec, query, deadline).await;
                (spec, outcome)
            }
        });

        future::join_all(tasks).await.into_iter().collect()
    }
}

/// One backend call: limiter slot, adapter invoke, normalize. The permit is
/// released on every exit path; losing one would starve all later
/// dispatches.
async fn call_one(
    adapter: Arc<dyn BackendAdapter>,
    limiter: Arc<Semaphore>,
    spec: BackendSpec,
    query: &Query,
    deadline: Option<Instant>,
) -> BackendOutcome {
    let attempt = async {
        let _permit = match limiter.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                return BackendOutcome::Failed {
                    kind: FailureKind::Transport,
                    message: format!("[Error - {}]: concurrency limiter closed", spec.name()),
                }
            }
        };

        match adapter.invoke(spec, query).await {
            Ok(raw) => match normalize::normalize(&raw) {
                Ok(map) => BackendOutcome::Structured(map),
                Err(err) => {
                    warn!(backend = spec.name(), error = %err, "reply did not normalize; keeping raw text");
                    BackendOutcome::Unstructured { raw }
                }
            },
            Err(err) => {
                warn!(backend = spec.name(), code = err.code(), error = %err, "backend call failed");
                BackendOutcome::from_error(spec, &err)
            }
        }
    };

    // The deadline covers limiter wait plus the call itself, so a saturated
    // limiter cannot make a deadlined dispatch hang.
    match deadline {
        None => attempt.await,
        Some(deadline) => {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match tokio::time::timeout(remaining, attempt).await {
                Ok(outcome) => outcome,
                Err(_) => BackendOutcome::Failed {
                    kind: FailureKind::Timeout,
                    message: format!("[Error - {}]: deadline exceeded", spec.name()),
                },
            }
        }
    }
}
