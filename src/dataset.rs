//! Evaluation corpus collaborator: loading and random sampling.
//!
//! The orchestrator only requires an ordered sequence of [`Query`]; this
//! module supplies one from the stored corpus format.

use std::path::Path;

use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;

use crate::query::{CandidateAcronym, Query};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One stored corpus row. `candidate_acronyms` is optional; rows without it
/// become bare queries and are still dispatched.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetEntry {
    pub query: String,
    #[serde(default)]
    pub candidate_acronyms: Vec<CandidateAcronym>,
}

impl From<DatasetEntry> for Query {
    fn from(entry: DatasetEntry) -> Self {
        Query::new(entry.query, entry.candidate_acronyms)
    }
}

/// In-memory evaluation corpus.
#[derive(Debug)]
pub struct Dataset {
    entries: Vec<DatasetEntry>,
}

impl Dataset {
    pub fn new(entries: Vec<DatasetEntry>) -> Self {
        Self { entries }
    }

    /// Load the full corpus from a JSON array file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<DatasetEntry> = serde_json::from_str(&raw)?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Draw `n` random queries (all of them if `n` exceeds the corpus).
    pub fn sample(&self, n: usize) -> Vec<Query> {
        let mut rng = rand::thread_rng();
        self.entries
            .choose_multiple(&mut rng, n.min(self.entries.len()))
            .cloned()
            .map(Query::from)
            .collect()
    }

    /// The whole corpus in stored order.
    pub fn all(&self) -> Vec<Query> {
        self.entries.iter().cloned().map(Query::from).collect()
    }
}
