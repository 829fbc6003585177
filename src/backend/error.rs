//! Error types for backend adapters.

use std::time::Duration;
use thiserror::Error;

use crate::query::FailureKind;

/// Errors that can occur when calling a backend.
///
/// All variants are backend-local: the dispatcher converts them into a
/// `Failed` outcome for that backend only, never aborting siblings.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The call did not complete within the request timeout.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// Non-2xx status, malformed envelope, or connection failure.
    #[error("{backend} transport error: {message}")]
    Transport {
        backend: &'static str,
        message: String,
    },

    /// HTTP client error from reqwest.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error (bad endpoint URL, missing API key, etc.).
    #[error("configuration error: {0}")]
    Config(String),
}

impl BackendError {
    pub fn transport(backend: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            backend,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Short code for call records and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "timeout",
            Self::Transport { .. } => "transport_error",
            Self::Http(_) => "http_error",
            Self::Config(_) => "config_error",
        }
    }

    /// Map to the outcome-level failure taxonomy.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Http(e) if e.is_timeout() => FailureKind::Timeout,
            _ => FailureKind::Transport,
        }
    }
}
