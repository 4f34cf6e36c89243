//! Dataset (multi-model archive) results

use serde::Serialize;

use crate::domain::characterization::CharacterizationResult;
use crate::domain::DomainError;

/// A successfully characterized archive member
#[derive(Debug, Clone, Serialize)]
pub struct DatasetEntry {
    pub filename: String,
    pub result: CharacterizationResult,
}

/// An archive member that failed to load or characterize
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetFailure {
    pub filename: String,
    pub reason: String,
}

/// Aggregated outcome of characterizing every model of an archive.
///
/// Each member name ends up in exactly one of `results`, `failures` or `skipped`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DatasetResult {
    pub label: String,
    pub results: Vec<DatasetEntry>,
    pub failures: Vec<DatasetFailure>,
    /// Directory entries and files without a supported extension
    pub skipped: Vec<String>,
}

impl DatasetResult {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn push_result(&mut self, filename: impl Into<String>, result: CharacterizationResult) {
        self.results.push(DatasetEntry {
            filename: filename.into(),
            result,
        });
    }

    pub fn push_failure(&mut self, filename: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(DatasetFailure {
            filename: filename.into(),
            reason: reason.into(),
        });
    }

    pub fn push_skipped(&mut self, filename: impl Into<String>) {
        self.skipped.push(filename.into());
    }

    /// Number of member names accounted for
    pub fn member_count(&self) -> usize {
        self.results.len() + self.failures.len() + self.skipped.len()
    }

    /// Aggregated report tree: one entry per characterized model
    pub fn to_json(&self) -> serde_json::Value {
        let models: Vec<serde_json::Value> = self
            .results
            .iter()
            .map(|entry| {
                serde_json::json!({
                    "filename": entry.filename,
                    "report": entry.result.tree,
                })
            })
            .collect();

        serde_json::json!({
            "dataset": self.label,
            "models": models,
            "failures": self.failures,
            "skipped": self.skipped,
        })
    }

    pub fn to_json_str(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(&self.to_json())
            .map_err(|e| DomainError::internal(format!("Failed to serialize dataset: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::characterization::{FactValue, FmCharacterization, FmFact, FmMetadata};

    fn result(name: &str) -> CharacterizationResult {
        let report = FmCharacterization {
            metadata: FmMetadata::named(name),
            metrics: vec![FmFact::new("Features", "Total", FactValue::Int(1))],
            analysis: vec![],
        };

        CharacterizationResult::from_report(&report).unwrap()
    }

    #[test]
    fn test_member_bookkeeping() {
        let mut dataset = DatasetResult::new("models.zip");
        dataset.push_result("a.uvl", result("a"));
        dataset.push_failure("b.xml", "bad xml");
        dataset.push_skipped("readme.txt");
        dataset.push_skipped("nested/");

        assert_eq!(dataset.member_count(), 4);
        assert_eq!(dataset.failures[0].reason, "bad xml");
    }

    #[test]
    fn test_aggregated_json() {
        let mut dataset = DatasetResult::new("models.zip");
        dataset.push_result("a.uvl", result("a"));
        dataset.push_result("b.uvl", result("b"));
        dataset.push_skipped("notes.md");

        let tree = dataset.to_json();
        assert_eq!(tree["dataset"], "models.zip");
        assert_eq!(tree["models"].as_array().unwrap().len(), 2);
        assert_eq!(tree["models"][1]["report"]["metadata"]["name"], "b");
        assert_eq!(tree["skipped"][0], "notes.md");

        let reparsed: serde_json::Value =
            serde_json::from_str(&dataset.to_json_str().unwrap()).unwrap();
        assert_eq!(reparsed, tree);
    }
}
