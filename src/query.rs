//! Core data model: queries, candidate acronyms, and per-backend outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::BackendError;
use crate::backend::BackendSpec;
use crate::normalize::CanonicalResult;

// =============================================================================
// QUERY
// =============================================================================

/// An acronym found in a query together with its dictionary-known expansions.
///
/// Candidates are kept as an ordered list rather than a map so the order in
/// which acronyms were discovered survives serialization and prompt rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateAcronym {
    /// Acronym token exactly as it appears in the query (case preserved).
    pub acronym: String,
    /// Known expansions, in dictionary order.
    pub expansions: Vec<String>,
}

impl CandidateAcronym {
    pub fn new(acronym: impl Into<String>, expansions: Vec<String>) -> Self {
        Self {
            acronym: acronym.into(),
            expansions,
        }
    }
}

/// One evaluation unit: a query string plus its precomputed candidates.
///
/// Constructed once, never mutated. Candidate discovery belongs to the
/// [`crate::catalog`] collaborator, not to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    pub candidates: Vec<CandidateAcronym>,
}

impl Query {
    pub fn new(text: impl Into<String>, candidates: Vec<CandidateAcronym>) -> Self {
        Self {
            text: text.into(),
            candidates,
        }
    }

    /// Query with no discovered acronyms. Still dispatched to backends.
    pub fn bare(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

/// One query plus the subset of backends enabled for this call.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub query: Query,
    pub backends: Vec<BackendSpec>,
}

impl DispatchRequest {
    pub fn new(query: Query, backends: Vec<BackendSpec>) -> Self {
        Self { query, backends }
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// Why a backend call failed. Backend-local; never aborts siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The call did not complete within the request timeout or deadline.
    Timeout,
    /// Connection error, non-2xx status, or malformed response envelope.
    Transport,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
        }
    }
}

/// Result of one (query, backend) pair after dispatch.
///
/// `Unstructured` means the backend answered but its reply could not be
/// coerced into the canonical mapping; the raw text is preserved for
/// inspection. Callers must render it distinctly from `Failed`, which means
/// the call itself did not produce a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendOutcome {
    /// Call succeeded and the reply normalized into the canonical mapping.
    Structured(CanonicalResult),
    /// Call succeeded but normalization failed; raw reply preserved.
    Unstructured { raw: String },
    /// The call itself failed.
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl BackendOutcome {
    pub fn from_error(spec: BackendSpec, err: &BackendError) -> Self {
        BackendOutcome::Failed {
            kind: err.failure_kind(),
            message: format!("[Error - {}]: {err}", spec.name()),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BackendOutcome::Failed { .. })
    }

    /// Render for the outbound response shapes: the canonical mapping on
    /// success, the raw text on normalization failure, an error-tagged
    /// string on call failure.
    pub fn render(&self) -> Value {
        match self {
            BackendOutcome::Structured(map) => Value::Object(map.clone()),
            BackendOutcome::Unstructured { raw } => Value::String(raw.clone()),
            BackendOutcome::Failed { message, .. } => Value::String(message.clone()),
        }
    }
}
