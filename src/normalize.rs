//! Response normalization: coerce raw backend text into the canonical
//! `acronym → [expansions]` mapping.
//!
//! Backends wrap valid JSON in prose, markdown code fences, or truncate
//! trailing text, so whole-text parsing fails often enough to need a
//! fallback. Unrestricted extraction risks grabbing an unrelated brace pair,
//! so the strategy is strict-parse-first, then the earliest non-greedy brace
//! match that parses to an object. First success wins.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// The canonical mapping all backends are expected to produce.
///
/// Only the container type is enforced: values that are not lists of strings
/// pass through unmodified rather than forcing a failure.
pub type CanonicalResult = serde_json::Map<String, Value>;

#[derive(Debug, Error)]
pub enum NormalizeError {
    /// No substring of the reply parsed as a JSON object.
    #[error("no JSON object found in backend reply")]
    NoObject,
}

fn brace_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*?\}").expect("static regex"))
}

/// Normalize a raw backend reply.
///
/// Errors never carry the raw text; callers must keep it themselves and
/// degrade to an unstructured outcome rather than discard the reply.
pub fn normalize(raw: &str) -> Result<CanonicalResult, NormalizeError> {
    // Stage 1: the whole reply is the mapping.
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(raw) {
        return Ok(map);
    }

    // Stage 2: earliest non-greedy `{ … }` candidate that parses to an
    // object. Non-greedy keeps candidates small and ordered; nested maps are
    // caught by stage 1 because well-formed nested output parses whole.
    for m in brace_pattern().find_iter(raw) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(m.as_str()) {
            return Ok(map);
        }
    }

    Err(NormalizeError::NoObject)
}
