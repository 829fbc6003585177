//! The fixed backend set and its endpoint configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::BackendError;

/// Default per-call timeout for every backend.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// One callable model endpoint/variant.
///
/// A small enumeration known at startup; no dynamic registration. The two
/// Qwen variants share one vLLM endpoint and differ only in whether the
/// LoRA adapter is selected via the served model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendSpec {
    /// Qwen base model via vLLM.
    QwenBase,
    /// Qwen with the acronym LoRA adapter, same vLLM endpoint.
    QwenLora,
    /// Hosted GPT deployment, used as the quality baseline.
    OpenAiGpt,
    /// TinyLlama with the acronym LoRA adapter; low-resource variant.
    TinyLlamaLora,
}

impl BackendSpec {
    /// Every backend, in the canonical reporting order.
    pub const ALL: [BackendSpec; 4] = [
        BackendSpec::QwenBase,
        BackendSpec::QwenLora,
        BackendSpec::OpenAiGpt,
        BackendSpec::TinyLlamaLora,
    ];

    /// Stable name used in response objects and report columns.
    pub fn name(&self) -> &'static str {
        match self {
            BackendSpec::QwenBase => "qwen_base",
            BackendSpec::QwenLora => "qwen_lora",
            BackendSpec::OpenAiGpt => "openai_gpt",
            BackendSpec::TinyLlamaLora => "tinyllama_lora",
        }
    }

    /// Model identifier sent on the wire.
    pub fn model_id(&self) -> &'static str {
        match self {
            BackendSpec::QwenBase => "Qwen/Qwen3-4B-Instruct-2507-FP8",
            BackendSpec::QwenLora => "acronym-lora",
            BackendSpec::OpenAiGpt => "gpt-4o-mini",
            BackendSpec::TinyLlamaLora => "acronym-lora",
        }
    }

    /// Whether this variant routes through a fine-tuned adapter on a shared
    /// endpoint rather than the base model.
    pub fn uses_adapter(&self) -> bool {
        matches!(self, BackendSpec::QwenLora | BackendSpec::TinyLlamaLora)
    }

    /// Hard cap on generated tokens. Expansions are short; the GPT baseline
    /// gets a little more headroom to match its deployment defaults.
    pub fn max_tokens(&self) -> u32 {
        match self {
            BackendSpec::OpenAiGpt => 512,
            _ => 400,
        }
    }
}

/// Boolean flags selecting which backends a call enables.
///
/// Matches the inbound request shape: everything on by default except the
/// low-resource TinyLlama adapter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BackendSelection {
    #[serde(default = "default_true")]
    pub use_qwen_base: bool,
    #[serde(default = "default_true")]
    pub use_qwen_lora: bool,
    #[serde(default = "default_true")]
    pub use_openai_gpt: bool,
    #[serde(default)]
    pub use_tinyllama_lora: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BackendSelection {
    fn default() -> Self {
        Self {
            use_qwen_base: true,
            use_qwen_lora: true,
            use_openai_gpt: true,
            use_tinyllama_lora: false,
        }
    }
}

impl BackendSelection {
    /// Enabled backends in canonical order.
    pub fn enabled(&self) -> Vec<BackendSpec> {
        BackendSpec::ALL
            .into_iter()
            .filter(|spec| match spec {
                BackendSpec::QwenBase => self.use_qwen_base,
                BackendSpec::QwenLora => self.use_qwen_lora,
                BackendSpec::OpenAiGpt => self.use_openai_gpt,
                BackendSpec::TinyLlamaLora => self.use_tinyllama_lora,
            })
            .collect()
    }
}

/// Endpoint configuration for the backend set.
///
/// The vLLM endpoint serves both Qwen variants and TinyLlama; the GPT
/// baseline has its own endpoint and bearer key.
#[derive(Debug, Clone)]
pub struct BackendEndpoints {
    pub vllm_base_url: String,
    pub openai_base_url: String,
    pub openai_api_key: Option<String>,
    pub call_timeout: Duration,
}

impl BackendEndpoints {
    pub fn new(vllm_base_url: impl Into<String>, openai_base_url: impl Into<String>) -> Self {
        Self {
            vllm_base_url: vllm_base_url.into(),
            openai_base_url: openai_base_url.into(),
            openai_api_key: None,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Read endpoints from the environment.
    ///
    /// `ACROBENCH_VLLM_URL` is required; `ACROBENCH_OPENAI_URL` and
    /// `ACROBENCH_OPENAI_API_KEY` configure the GPT baseline;
    /// `ACROBENCH_TIMEOUT_SECONDS` overrides the 30 s call timeout.
    pub fn from_env() -> Result<Self, BackendError> {
        let vllm_base_url = std::env::var("ACROBENCH_VLLM_URL")
            .map_err(|_| BackendError::config("ACROBENCH_VLLM_URL not set"))?;

        let openai_base_url = std::env::var("ACROBENCH_OPENAI_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".into());

        let call_timeout = std::env::var("ACROBENCH_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CALL_TIMEOUT);

        Ok(Self {
            vllm_base_url,
            openai_base_url,
            openai_api_key: std::env::var("ACROBENCH_OPENAI_API_KEY").ok(),
            call_timeout,
        })
    }

    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Chat completions URL for a given backend.
    pub fn chat_url(&self, spec: BackendSpec) -> String {
        let base = match spec {
            BackendSpec::OpenAiGpt => &self.openai_base_url,
            _ => &self.vllm_base_url,
        };
        format!("{}/chat/completions", base.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_excludes_tinyllama() {
        let enabled = BackendSelection::default().enabled();
        assert_eq!(
            enabled,
            vec![
                BackendSpec::QwenBase,
                BackendSpec::QwenLora,
                BackendSpec::OpenAiGpt
            ]
        );
    }

    #[test]
    fn selection_flags_deserialize_with_defaults() {
        let sel: BackendSelection = serde_json::from_str("{}").unwrap();
        assert!(sel.use_qwen_base && sel.use_qwen_lora && sel.use_openai_gpt);
        assert!(!sel.use_tinyllama_lora);

        let sel: BackendSelection =
            serde_json::from_str(r#"{"use_qwen_base": false, "use_tinyllama_lora": true}"#)
                .unwrap();
        assert!(!sel.use_qwen_base);
        assert!(sel.use_tinyllama_lora);
    }

    #[test]
    fn qwen_variants_share_the_vllm_endpoint() {
        let eps = BackendEndpoints::new("http://vllm:8000/v1", "https://api.openai.com/v1");
        assert_eq!(
            eps.chat_url(BackendSpec::QwenBase),
            eps.chat_url(BackendSpec::QwenLora)
        );
        assert_ne!(
            eps.chat_url(BackendSpec::QwenBase),
            eps.chat_url(BackendSpec::OpenAiGpt)
        );
    }

    #[test]
    fn adapter_flag_distinguishes_lora_variants() {
        assert!(!BackendSpec::QwenBase.uses_adapter());
        assert!(BackendSpec::QwenLora.uses_adapter());
        assert_eq!(BackendSpec::QwenBase.name(), "qwen_base");
    }
}
