//! Characterization report

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

use super::metadata::FmMetadata;

/// Value of a single fact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Int(u64),
    Float(f64),
    Text(String),
    Names(Vec<String>),
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{:.2}", v),
            Self::Text(v) => write!(f, "{}", v),
            Self::Names(names) => write!(f, "{} ({})", names.len(), names.join(", ")),
        }
    }
}

/// A named fact about a feature model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FmFact {
    pub name: String,
    pub description: String,
    pub value: FactValue,
    /// Nesting level below the top-level fact it refines
    #[serde(default)]
    pub level: usize,
    /// Share of the parent fact, between 0 and 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratio: Option<f64>,
}

impl FmFact {
    pub fn new(name: impl Into<String>, description: impl Into<String>, value: FactValue) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value,
            level: 0,
            ratio: None,
        }
    }

    pub fn at_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    /// Attach `part / whole` as ratio; skipped when `whole` is zero
    pub fn with_ratio(mut self, part: usize, whole: usize) -> Self {
        if whole > 0 {
            self.ratio = Some(part as f64 / whole as f64);
        }
        self
    }
}

impl fmt::Display for FmFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}: {}", "  ".repeat(self.level), self.name, self.value)?;

        if let Some(ratio) = self.ratio {
            write!(f, " ({:.2}%)", ratio * 100.0)?;
        }

        Ok(())
    }
}

/// Characterization report of one feature model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FmCharacterization {
    pub metadata: FmMetadata,
    pub metrics: Vec<FmFact>,
    pub analysis: Vec<FmFact>,
}

impl FmCharacterization {
    /// Structured (JSON tree) form
    pub fn to_json(&self) -> Result<serde_json::Value, DomainError> {
        serde_json::to_value(self)
            .map_err(|e| DomainError::internal(format!("Failed to serialize report: {}", e)))
    }

    /// Canonical JSON string form
    pub fn to_json_str(&self) -> Result<String, DomainError> {
        let tree = self.to_json()?;

        serde_json::to_string_pretty(&tree)
            .map_err(|e| DomainError::internal(format!("Failed to serialize report: {}", e)))
    }

    pub fn metric(&self, name: &str) -> Option<&FmFact> {
        self.metrics.iter().find(|fact| fact.name == name)
    }

    pub fn analysis_fact(&self, name: &str) -> Option<&FmFact> {
        self.analysis.iter().find(|fact| fact.name == name)
    }
}

impl fmt::Display for FmCharacterization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metadata;

        writeln!(f, "METADATA")?;
        for (label, value) in [
            ("Name", &m.name),
            ("Description", &m.description),
            ("Author", &m.author),
            ("Year", &m.year),
            ("Tags", &m.tags),
            ("Reference", &m.reference),
            ("Domains", &m.domains),
        ] {
            writeln!(f, "{}: {}", label, value)?;
        }

        writeln!(f)?;
        writeln!(f, "METRICS")?;
        for fact in &self.metrics {
            writeln!(f, "{}", fact)?;
        }

        writeln!(f)?;
        writeln!(f, "ANALYSIS")?;
        for fact in &self.analysis {
            writeln!(f, "{}", fact)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> FmCharacterization {
        FmCharacterization {
            metadata: FmMetadata::named("Pizzas"),
            metrics: vec![
                FmFact::new("Features", "Total features", FactValue::Int(12)),
                FmFact::new("Abstract features", "Abstract", FactValue::Int(3))
                    .at_level(1)
                    .with_ratio(3, 12),
                FmFact::new("Root feature", "Root", FactValue::Text("Pizza".to_string())),
                FmFact::new(
                    "Top features",
                    "Root children",
                    FactValue::Names(vec!["Topping".to_string(), "Size".to_string()]),
                ),
                FmFact::new("Branching factor", "Mean children", FactValue::Float(2.5)),
            ],
            analysis: vec![FmFact::new(
                "Tree configurations",
                "Configurations",
                FactValue::Int(42),
            )],
        }
    }

    #[test]
    fn test_json_string_round_trips_to_tree() {
        let report = sample_report();
        let tree = report.to_json().unwrap();
        let json = report.to_json_str().unwrap();

        let reparsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, tree);
    }

    #[test]
    fn test_report_deserializes_from_tree() {
        let report = sample_report();
        let tree = report.to_json().unwrap();

        let back: FmCharacterization = serde_json::from_value(tree).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_ratio_skipped_for_zero_whole() {
        let fact = FmFact::new("x", "", FactValue::Int(0)).with_ratio(0, 0);
        assert!(fact.ratio.is_none());
    }

    #[test]
    fn test_display_sections_and_indentation() {
        let text = sample_report().to_string();

        assert!(text.starts_with("METADATA\nName: Pizzas\n"));
        assert!(text.contains("\nMETRICS\nFeatures: 12\n"));
        assert!(text.contains("\n  Abstract features: 3 (25.00%)\n"));
        assert!(text.contains("Top features: 2 (Topping, Size)"));
        assert!(text.contains("Branching factor: 2.50"));
        assert!(text.contains("\nANALYSIS\nTree configurations: 42\n"));
    }
}
