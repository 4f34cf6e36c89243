//! Factory for feature model parsers

use std::sync::Arc;

use crate::domain::feature_model::{FeatureModelParser, ModelFormat};

use super::parsers::{FeatureIdeParser, UvlParser};

/// Factory for creating feature model parsers
#[derive(Debug, Default)]
pub struct ParserFactory;

impl ParserFactory {
    /// Create the parser for the given format
    pub fn create(format: ModelFormat) -> Arc<dyn FeatureModelParser> {
        match format {
            ModelFormat::FeatureIde => Arc::new(FeatureIdeParser::new()),
            ModelFormat::Uvl => Arc::new(UvlParser::new()),
        }
    }

    /// Parser for a file name, selected by extension
    pub fn for_filename(filename: &str) -> Option<Arc<dyn FeatureModelParser>> {
        ModelFormat::from_filename(filename).map(Self::create)
    }

    /// Whether a file name has an extension with a registered parser
    pub fn is_supported(filename: &str) -> bool {
        ModelFormat::from_filename(filename).is_some()
    }

    /// All supported file extensions
    pub fn supported_extensions() -> Vec<&'static str> {
        ModelFormat::ALL
            .iter()
            .flat_map(|format| format.extensions().iter().copied())
            .collect()
    }
}
