//! Acronym dictionary collaborator.
//!
//! The core consumes precomputed candidates; this catalog is the thin
//! collaborator that produces them for the interactive path. Injected at
//! construction time rather than loaded at import, so the process entry
//! point owns its lifecycle.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::query::{CandidateAcronym, Query};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read acronym dictionary: {0}")]
    Io(#[from] std::io::Error),
    #[error("acronym dictionary is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Dictionary of known acronyms and their expansions.
#[derive(Debug)]
pub struct AcronymCatalog {
    entries: HashMap<String, Vec<String>>,
    word_pattern: Regex,
}

impl AcronymCatalog {
    pub fn new(entries: HashMap<String, Vec<String>>) -> Self {
        Self {
            entries,
            word_pattern: Regex::new(r"\b[a-zA-Z]+\b").expect("static regex"),
        }
    }

    /// Load from a JSON file shaped `{"ACRONYM": ["expansion", ...], ...}`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(&raw)?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Scan the query's word tokens against the dictionary, case-sensitive,
    /// keeping discovery order and first occurrence only.
    pub fn find(&self, text: &str) -> Vec<CandidateAcronym> {
        let mut found = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for m in self.word_pattern.find_iter(text) {
            let word = m.as_str();
            if seen.contains(&word) {
                continue;
            }
            if let Some(expansions) = self.entries.get(word) {
                found.push(CandidateAcronym::new(word, expansions.clone()));
                seen.push(word);
            }
        }
        found
    }

    /// Build a [`Query`] with this catalog's candidates for `text`.
    pub fn query(&self, text: impl Into<String>) -> Query {
        let text = text.into();
        let candidates = self.find(&text);
        Query::new(text, candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AcronymCatalog {
        let mut entries = HashMap::new();
        entries.insert(
            "AI".to_string(),
            vec![
                "artificial intelligence".to_string(),
                "Action Items".to_string(),
            ],
        );
        entries.insert(
            "okr".to_string(),
            vec!["Objectives and Key Results".to_string()],
        );
        AcronymCatalog::new(entries)
    }

    #[test]
    fn finds_known_acronyms_in_discovery_order() {
        let found = catalog().find("update the okr for the AI team");
        let names: Vec<&str> = found.iter().map(|c| c.acronym.as_str()).collect();
        assert_eq!(names, ["okr", "AI"]);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let found = catalog().find("the ai team");
        assert!(found.is_empty());
    }

    #[test]
    fn repeated_acronym_is_reported_once() {
        let found = catalog().find("AI here and AI there");
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn unknown_words_yield_a_bare_query() {
        let query = catalog().query("hello world");
        assert!(query.candidates.is_empty());
        assert_eq!(query.text, "hello world");
    }

    #[test]
    fn loads_dictionary_from_json_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"AI": ["Artificial Intelligence"]}}"#).unwrap();

        let catalog = AcronymCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.find("the AI team").len(), 1);
    }

    #[test]
    fn malformed_dictionary_is_a_parse_error() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AcronymCatalog::load(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
