//! Rendered characterization result

use serde::Serialize;

use crate::domain::DomainError;

use super::metadata::FmMetadata;
use super::report::FmCharacterization;

/// A characterization report in its three output forms, all derived from the
/// same report value
#[derive(Debug, Clone, Serialize)]
pub struct CharacterizationResult {
    pub metadata: FmMetadata,
    /// Structured form
    #[serde(rename = "report")]
    pub tree: serde_json::Value,
    /// Canonical JSON string of `tree`
    #[serde(skip)]
    pub json: String,
    /// Human-readable form
    pub text: String,
}

impl CharacterizationResult {
    pub fn from_report(report: &FmCharacterization) -> Result<Self, DomainError> {
        let tree = report.to_json()?;
        let json = serde_json::to_string_pretty(&tree)
            .map_err(|e| DomainError::internal(format!("Failed to serialize report: {}", e)))?;

        Ok(Self {
            metadata: report.metadata.clone(),
            tree,
            json,
            text: report.to_string(),
        })
    }

    /// File name stem used for downloads
    pub fn download_stem(&self) -> String {
        let stem: String = self
            .metadata
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();

        if stem.is_empty() {
            "fm_facts".to_string()
        } else {
            stem
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::characterization::{FactValue, FmFact};

    fn sample_result() -> CharacterizationResult {
        let report = FmCharacterization {
            metadata: FmMetadata::named("My model v1.0"),
            metrics: vec![FmFact::new("Features", "Total", FactValue::Int(4))],
            analysis: vec![],
        };

        CharacterizationResult::from_report(&report).unwrap()
    }

    #[test]
    fn test_forms_are_consistent() {
        let result = sample_result();

        let reparsed: serde_json::Value = serde_json::from_str(&result.json).unwrap();
        assert_eq!(reparsed, result.tree);
        assert!(result.text.contains("Features: 4"));
        assert_eq!(result.tree["metadata"]["name"], "My model v1.0");
    }

    #[test]
    fn test_ratio_facts_reparse_exactly() {
        let report = FmCharacterization {
            metadata: FmMetadata::named("Ratios"),
            metrics: vec![
                FmFact::new("Features", "Total", FactValue::Int(11)),
                FmFact::new("Leaf features", "Leaves", FactValue::Int(1))
                    .at_level(1)
                    .with_ratio(1, 11),
                FmFact::new("Abstract features", "Abstract", FactValue::Int(7))
                    .at_level(1)
                    .with_ratio(7, 13),
            ],
            analysis: vec![FmFact::new("Homogeneity", "Shared", FactValue::Float(2.0 / 3.0))],
        };

        let result = CharacterizationResult::from_report(&report).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&result.json).unwrap();

        assert_eq!(reparsed, result.tree);
    }

    #[test]
    fn test_serialization_skips_json_string() {
        let value = serde_json::to_value(sample_result()).unwrap();

        assert!(value.get("report").is_some());
        assert!(value.get("text").is_some());
        assert!(value.get("json").is_none());
    }

    #[test]
    fn test_download_stem() {
        assert_eq!(sample_result().download_stem(), "My_model_v1_0");
    }
}
