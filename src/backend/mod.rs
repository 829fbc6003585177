//! Backend adapters for the model endpoints under comparison.

pub mod chat;
pub mod error;
pub mod spec;
pub mod usage;

pub use chat::{BackendAdapter, ChatBackendAdapter};
pub use error::BackendError;
pub use spec::{BackendEndpoints, BackendSelection, BackendSpec};
pub use usage::{CallRecord, CallSink, CallStatus, NoopCallSink, StderrCallSink};
