//! Per-call logging via the CallSink trait.
//!
//! The adapter reports every backend call through a CallSink. This decouples
//! it from any storage or metrics backend: the CLI uses NoopCallSink or
//! StderrCallSink, tests inject their own recorder.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::spec::BackendSpec;

/// Status of a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Success,
    Error,
}

impl CallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Success => "success",
            CallStatus::Error => "error",
        }
    }
}

/// Record of one backend call.
#[derive(Debug, Clone)]
pub struct CallRecord {
    pub backend: &'static str,
    pub model: &'static str,
    pub status: CallStatus,
    /// Error code if status is Error.
    pub error_code: Option<&'static str>,
    pub latency_ms: i64,
    pub timestamp: DateTime<Utc>,
}

impl CallRecord {
    pub fn success(spec: BackendSpec, latency_ms: i64) -> Self {
        Self {
            backend: spec.name(),
            model: spec.model_id(),
            status: CallStatus::Success,
            error_code: None,
            latency_ms,
            timestamp: Utc::now(),
        }
    }

    pub fn error(spec: BackendSpec, code: &'static str, latency_ms: i64) -> Self {
        Self {
            backend: spec.name(),
            model: spec.model_id(),
            status: CallStatus::Error,
            error_code: Some(code),
            latency_ms,
            timestamp: Utc::now(),
        }
    }
}

/// Trait for recording backend call usage.
///
/// Fire-and-forget: implementations should log failures, not propagate them.
#[async_trait]
pub trait CallSink: Send + Sync {
    async fn record(&self, record: CallRecord);
}

/// Discards all records. For tests and quiet CLI runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallSink;

#[async_trait]
impl CallSink for NoopCallSink {
    async fn record(&self, _record: CallRecord) {}
}

/// Writes one JSON line per call to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrCallSink;

#[async_trait]
impl CallSink for StderrCallSink {
    async fn record(&self, record: CallRecord) {
        eprintln!(
            r#"{{"backend":"{}","model":"{}","status":"{}","error_code":{},"latency_ms":{}}}"#,
            record.backend,
            record.model,
            record.status.as_str(),
            record
                .error_code
                .map(|c| format!("\"{c}\""))
                .unwrap_or_else(|| "null".into()),
            record.latency_ms,
        );
    }
}
