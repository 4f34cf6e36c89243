//! Reads feature model files from disk

use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::domain::feature_model::{FeatureModel, ModelInput};
use crate::domain::DomainError;

use super::factory::ParserFactory;

/// Loads a feature model file through the parser matching its extension
#[derive(Debug, Clone, Default)]
pub struct ModelIngester;

impl ModelIngester {
    pub fn new() -> Self {
        Self
    }

    /// Read and parse the model at `path`.
    ///
    /// Unsupported extensions, non-UTF-8 content, parse failures and
    /// ill-formed trees are format errors carrying `path`; other read
    /// failures are I/O errors.
    pub fn ingest(&self, path: &Path) -> Result<FeatureModel, DomainError> {
        let filename = path.to_string_lossy();

        let parser = ParserFactory::for_filename(&filename).ok_or_else(|| {
            DomainError::format(
                path,
                format!(
                    "unsupported file type, expected one of: {}",
                    ParserFactory::supported_extensions()
                        .iter()
                        .map(|ext| format!(".{}", ext))
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
        })?;

        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::InvalidData => DomainError::format(path, "file is not valid UTF-8 text"),
            _ => DomainError::io(format!("Failed to read '{}': {}", path.display(), e)),
        })?;

        let model = parser.parse(&ModelInput::new(content, &*filename))?;

        model.validate().map_err(|e| match e {
            DomainError::Validation { message } => DomainError::format(path, message),
            other => other,
        })?;

        debug!(
            path = %path.display(),
            format = parser.format().name(),
            features = model.feature_names().len(),
            constraints = model.constraints.len(),
            "Ingested feature model"
        );

        Ok(model)
    }
}
