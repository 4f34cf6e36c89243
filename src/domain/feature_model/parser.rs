//! Feature model parser trait and types

use std::fmt::Debug;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

use super::entity::FeatureModel;

/// Deepest feature tree or constraint formula a parser accepts
pub const MAX_NESTING_DEPTH: usize = 256;

/// Supported feature model file formats
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ModelFormat {
    /// FeatureIDE XML models
    FeatureIde,
    /// Universal Variability Language
    Uvl,
}

impl ModelFormat {
    pub const ALL: [ModelFormat; 2] = [ModelFormat::FeatureIde, ModelFormat::Uvl];

    /// File extensions associated with this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::FeatureIde => &["xml"],
            Self::Uvl => &["uvl"],
        }
    }

    /// Detect the format from a file name's extension (case-insensitive)
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();

        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FeatureIde => "FeatureIDE",
            Self::Uvl => "UVL",
        }
    }
}

/// Input for feature model parsing
#[derive(Debug, Clone)]
pub struct ModelInput {
    /// File content
    pub content: String,
    /// Where the content came from, used in error messages
    pub source: String,
}

impl ModelInput {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
        }
    }
}

/// Reader for one feature model format
pub trait FeatureModelParser: Send + Sync + Debug {
    /// Format handled by this parser
    fn format(&self) -> ModelFormat;

    /// Parse a feature model, failing with a format error on malformed input
    fn parse(&self, input: &ModelInput) -> Result<FeatureModel, DomainError>;

    /// Check if this parser handles a given filename
    fn supports_file(&self, filename: &str) -> bool {
        ModelFormat::from_filename(filename) == Some(self.format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(ModelFormat::from_filename("model.uvl"), Some(ModelFormat::Uvl));
        assert_eq!(ModelFormat::from_filename("model.UVL"), Some(ModelFormat::Uvl));
        assert_eq!(
            ModelFormat::from_filename("models/car.xml"),
            Some(ModelFormat::FeatureIde)
        );
        assert_eq!(ModelFormat::from_filename("readme.txt"), None);
        assert_eq!(ModelFormat::from_filename("noextension"), None);
        assert_eq!(ModelFormat::from_filename("folder/"), None);
    }

    #[test]
    fn test_format_serialization() {
        assert_eq!(
            serde_json::to_string(&ModelFormat::FeatureIde).unwrap(),
            "\"feature_ide\""
        );
    }
}
