//! Prompt construction for the acronym-expansion task.
//!
//! The instruction block is immutable and backend-independent: a preamble
//! plus `###`-delimited input/output example pairs, parsed once into system
//! and few-shot message turns. Per-query content is a single trailing user
//! turn rendering the query and its candidates.

use std::sync::OnceLock;

use crate::backend::chat::Message;
use crate::query::{CandidateAcronym, Query};

/// Task instruction with worked examples. Parts are `###`-delimited: the
/// first part becomes the system turn, the rest alternate user/assistant.
pub const SYSTEM_PROMPT: &str = r#"You are a precise assistant tasked with selecting only the **most relevant acronym expansions** from a given list, based strictly on the user's query.

Instructions:
- Only include expansions that are clearly and directly related to the query's context.
- If multiple meanings are relevant, include all of them.
- If no acronym is relevant, return an empty dictionary: `{}`.
- Acronyms must appear in the query to be considered.
- Preserve the acronym casing as it appears in the query.
- Output must be a valid **JSON dictionary**:
  - Keys: acronyms found in the query.
  - Values: lists of relevant expansions (as strings).

Output Format:
{
  "ACRONYM1": ["Relevant Expansion 1", "Relevant Expansion 2",...],
  "ACRONYM2": ["Relevant Expansion 1", "Relevant Expansion 2",...],
}

Examples:
###
Query: Who leads the AI team
Candidate Acronyms:
AI: artificial intelligence, Artificial Intelligence, Action Items
###
{"AI": ["artificial intelligence"]}
###
Query: who is the current cpo
Candidate Acronyms:
cpo: Chief People Officer, Chief Product and Customer Officer, Chief Product Officer
###
{"cpo": ["Chief People Officer", "Chief Product Officer"]}
###
Query: update the okr
Candidate Acronyms:
okr: Objectives and Key Results, Office of Knowledge Research
###
{"okr": ["Objectives and Key Results"]}
###
Query: can you help me with this
Candidate Acronyms:
can: Canada
you: Young Outstanding Undergraduates
###
{}
###"#;

/// Split a `###`-delimited instruction block into message turns.
fn parse_raw_prompt(raw: &str) -> Vec<Message> {
    let parts: Vec<&str> = raw
        .split("###")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut messages = Vec::with_capacity(parts.len());
    if let Some(system) = parts.first() {
        messages.push(Message::system(*system));
    }

    let mut rest = parts[1..].chunks_exact(2);
    for pair in rest.by_ref() {
        messages.push(Message::user(pair[0]));
        messages.push(Message::assistant(pair[1]));
    }
    if let Some(&user) = rest.remainder().first() {
        messages.push(Message::user(user));
    }

    messages
}

fn instruction_messages() -> &'static [Message] {
    static MESSAGES: OnceLock<Vec<Message>> = OnceLock::new();
    MESSAGES.get_or_init(|| parse_raw_prompt(SYSTEM_PROMPT))
}

/// Render candidates as `ACRONYM: expansion1, expansion2` lines, one per
/// found acronym, in discovery order.
pub fn render_candidates(candidates: &[CandidateAcronym]) -> String {
    candidates
        .iter()
        .map(|c| format!("{}: {}", c.acronym, c.expansions.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render the per-query user turn.
pub fn render_user_turn(query: &Query) -> String {
    format!(
        "Query: {}\nCandidate Acronyms:\n{}",
        query.text,
        render_candidates(&query.candidates)
    )
}

/// Full message sequence for one backend call: instruction + few-shot turns
/// + the query's user turn.
pub fn expansion_messages(query: &Query) -> Vec<Message> {
    let mut messages = instruction_messages().to_vec();
    messages.push(Message::user(render_user_turn(query)));
    messages
}
