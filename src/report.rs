//! Outbound response shapes and tabular flattening.
//!
//! These are the objects handed back to collaborators: a per-query report
//! with one rendered outcome per backend name, the batch wrapper around an
//! ordered list of them, and a row form a tabular exporter can write
//! without further transformation.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::batch::{BatchEntry, BatchResult};
use crate::dispatch::DispatchOutcomes;
use crate::query::Query;

/// Outbound shape for one processed query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    /// Original query text.
    pub query: String,
    /// The candidate mapping used for the call.
    pub acronyms_found: Map<String, Value>,
    /// Backend name → rendered outcome: canonical mapping on success, raw
    /// text on normalization failure, error-tagged string on call failure.
    pub results: Map<String, Value>,
}

impl QueryReport {
    pub fn new(query: &Query, outcomes: &DispatchOutcomes) -> Self {
        let mut acronyms_found = Map::new();
        for candidate in &query.candidates {
            acronyms_found.insert(
                candidate.acronym.clone(),
                Value::Array(
                    candidate
                        .expansions
                        .iter()
                        .map(|e| Value::String(e.clone()))
                        .collect(),
                ),
            );
        }

        let mut results = Map::new();
        for (spec, outcome) in outcomes {
            results.insert(spec.name().to_string(), outcome.render());
        }

        Self {
            query: query.text.clone(),
            acronyms_found,
            results,
        }
    }

    /// Flatten into an ordered `(column, cell)` row: query, candidates,
    /// then one column per backend. Cells are JSON-encoded strings, ready
    /// for a collaborator-owned spreadsheet writer.
    pub fn to_row(&self) -> Vec<(String, String)> {
        let mut row = Vec::with_capacity(2 + self.results.len());
        row.push(("query".to_string(), self.query.clone()));
        row.push((
            "acronyms_found".to_string(),
            Value::Object(self.acronyms_found.clone()).to_string(),
        ));
        for (backend, rendered) in &self.results {
            let cell = match rendered {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            row.push((backend.clone(), cell));
        }
        row
    }
}

/// Outbound shape for a whole batch, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub total_samples: usize,
    pub data: Vec<QueryReport>,
}

impl BatchReport {
    pub fn new(result: &BatchResult) -> Self {
        let data: Vec<QueryReport> = result
            .entries
            .iter()
            .map(|BatchEntry { query, outcomes }| QueryReport::new(query, outcomes))
            .collect();
        Self {
            total_samples: data.len(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendSpec;
    use crate::query::{BackendOutcome, CandidateAcronym, FailureKind};
    use serde_json::json;

    fn sample_outcomes() -> DispatchOutcomes {
        let mut structured = serde_json::Map::new();
        structured.insert("AI".into(), json!(["Artificial Intelligence"]));

        let mut outcomes = DispatchOutcomes::new();
        outcomes.insert(BackendSpec::QwenLora, BackendOutcome::Structured(structured));
        outcomes.insert(
            BackendSpec::QwenBase,
            BackendOutcome::Unstructured {
                raw: "no json here".into(),
            },
        );
        outcomes.insert(
            BackendSpec::OpenAiGpt,
            BackendOutcome::Failed {
                kind: FailureKind::Timeout,
                message: "[Error - openai_gpt]: timeout after 30s".into(),
            },
        );
        outcomes
    }

    fn sample_query() -> Query {
        Query::new(
            "who runs the AI team",
            vec![CandidateAcronym::new(
                "AI",
                vec!["Artificial Intelligence".into(), "Action Items".into()],
            )],
        )
    }

    #[test]
    fn report_renders_one_entry_per_backend() {
        let report = QueryReport::new(&sample_query(), &sample_outcomes());
        assert_eq!(report.results.len(), 3);
        assert_eq!(
            report.results["qwen_lora"],
            json!({"AI": ["Artificial Intelligence"]})
        );
        assert_eq!(report.results["qwen_base"], json!("no json here"));
        assert!(report.results["openai_gpt"]
            .as_str()
            .unwrap()
            .starts_with("[Error - openai_gpt]"));
    }

    #[test]
    fn report_serializes_with_candidate_mapping() {
        let report = QueryReport::new(&sample_query(), &sample_outcomes());
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["query"], "who runs the AI team");
        assert_eq!(
            value["acronyms_found"]["AI"],
            json!(["Artificial Intelligence", "Action Items"])
        );
    }

    #[test]
    fn row_has_one_column_per_backend() {
        let report = QueryReport::new(&sample_query(), &sample_outcomes());
        let row = report.to_row();
        let columns: Vec<&str> = row.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(
            columns,
            ["query", "acronyms_found", "openai_gpt", "qwen_base", "qwen_lora"]
        );
        // Unstructured cells carry the raw text verbatim.
        let qwen_base = &row.iter().find(|(c, _)| c == "qwen_base").unwrap().1;
        assert_eq!(qwen_base, "no json here");
    }

    #[test]
    fn batch_report_counts_and_orders_entries() {
        let result = BatchResult {
            entries: vec![
                BatchEntry {
                    query: Query::bare("first"),
                    outcomes: DispatchOutcomes::new(),
                },
                BatchEntry {
                    query: Query::bare("second"),
                    outcomes: DispatchOutcomes::new(),
                },
            ],
        };
        let report = BatchReport::new(&result);
        assert_eq!(report.total_samples, 2);
        assert_eq!(report.data[0].query, "first");
        assert_eq!(report.data[1].query, "second");
    }
}
