//! Chat-completions adapter for the backend endpoints.
//!
//! Every backend speaks the OpenAI-compatible `chat/completions` shape (the
//! vLLM server for the Qwen/TinyLlama variants, the hosted deployment for
//! the GPT baseline), so one adapter parameterized by [`BackendSpec`] covers
//! the whole set.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::prompts;
use crate::query::Query;

use super::error::BackendError;
use super::spec::{BackendEndpoints, BackendSpec};
use super::usage::{CallRecord, CallSink, NoopCallSink};

/// Deterministic generation: greedy sampling with a fixed nucleus threshold.
const TEMPERATURE: f32 = 0.0;
const TOP_P: f32 = 0.9;

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

// =============================================================================
// ADAPTER
// =============================================================================

/// One backend call: canonical request in, raw reply text or typed failure
/// out. Implementations are stateless and safe to invoke concurrently.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    async fn invoke(&self, spec: BackendSpec, query: &Query) -> Result<String, BackendError>;
}

/// HTTP adapter over the configured endpoints.
#[derive(Clone)]
pub struct ChatBackendAdapter {
    client: reqwest::Client,
    endpoints: BackendEndpoints,
    sink: Arc<dyn CallSink>,
}

impl ChatBackendAdapter {
    pub fn new(endpoints: BackendEndpoints) -> Result<Self, BackendError> {
        Self::with_sink(endpoints, Arc::new(NoopCallSink))
    }

    /// Create from `ACROBENCH_*` environment variables.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::new(BackendEndpoints::from_env()?)
    }

    pub fn with_sink(
        endpoints: BackendEndpoints,
        sink: Arc<dyn CallSink>,
    ) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(endpoints.call_timeout)
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| BackendError::config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoints,
            sink,
        })
    }

    async fn chat(&self, spec: BackendSpec, query: &Query) -> Result<String, BackendError> {
        let messages = prompts::expansion_messages(query);

        let api_req = ChatApiRequest {
            model: spec.model_id(),
            messages: &messages,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            max_tokens: spec.max_tokens(),
        };

        let mut request = self.client.post(self.endpoints.chat_url(spec)).json(&api_req);
        if spec == BackendSpec::OpenAiGpt {
            if let Some(key) = &self.endpoints.openai_api_key {
                request = request.bearer_auth(key);
            }
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Timeout(self.endpoints.call_timeout)
            } else {
                BackendError::Http(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Surface the provider's own message when the error body parses.
            if let Ok(parsed) = serde_json::from_str::<ChatApiResponse>(&body) {
                if let Some(error) = parsed.error {
                    return Err(BackendError::transport(
                        spec.name(),
                        format!(
                            "HTTP {}: {}",
                            status.as_u16(),
                            error.message.unwrap_or_default()
                        ),
                    ));
                }
            }
            return Err(BackendError::transport(
                spec.name(),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let parsed: ChatApiResponse = serde_json::from_str(&body)
            .map_err(|e| BackendError::transport(spec.name(), format!("invalid JSON: {e}")))?;

        if let Some(error) = parsed.error {
            return Err(BackendError::transport(
                spec.name(),
                error.message.unwrap_or_default(),
            ));
        }

        parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| BackendError::transport(spec.name(), "missing message content"))
    }
}

#[async_trait]
impl BackendAdapter for ChatBackendAdapter {
    async fn invoke(&self, spec: BackendSpec, query: &Query) -> Result<String, BackendError> {
        let start = Instant::now();
        let result = self.chat(spec, query).await;
        let latency_ms = start.elapsed().as_millis() as i64;

        let record = match &result {
            Ok(_) => CallRecord::success(spec, latency_ms),
            Err(err) => CallRecord::error(spec, err.code(), latency_ms),
        };
        self.sink.record(record).await;

        result
    }
}
