#![forbid(unsafe_code)]

//! # acrobench
//!
//! Compares acronym-expansion quality across several language-model
//! backends: a LoRA-fine-tuned adapter, its base model, a hosted GPT
//! baseline, and an optional low-resource variant.
//!
//! One query fans out to every enabled backend concurrently under a global
//! in-flight cap. Each backend's free-text reply is coerced into a canonical
//! `acronym → [expansions]` mapping, tolerating prose wrapping, code fences,
//! and truncation. Failures stay backend-local: a dead endpoint degrades its
//! own slot to a typed failure and never touches its siblings, so a batch
//! always comes back structurally complete and in input order.

pub mod backend;
pub mod batch;
pub mod catalog;
pub mod dataset;
pub mod dispatch;
pub mod normalize;
pub mod prompts;
pub mod query;
pub mod report;

pub use backend::{
    BackendAdapter, BackendEndpoints, BackendError, BackendSelection, BackendSpec,
    ChatBackendAdapter, NoopCallSink, StderrCallSink,
};
pub use batch::{
    run_batch, BatchOptions, BatchResult, NoopProgressSink, ProgressSink, TracingProgressSink,
};
pub use dispatch::{DispatchOutcomes, Dispatcher};
pub use normalize::{normalize, CanonicalResult, NormalizeError};
pub use query::{BackendOutcome, CandidateAcronym, DispatchRequest, FailureKind, Query};
pub use report::{BatchReport, QueryReport};
