use std::path::Path;

use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Format error in '{path}': {message}")]
    Format { path: String, message: String },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("I/O error: {message}")]
    Io { message: String },

    #[error("No valid feature models found in '{dataset}' ({} failed)", .failures.len())]
    NoValidModels {
        dataset: String,
        /// `filename: reason` for every entry that failed to load
        failures: Vec<String>,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn format(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    pub fn archive(message: impl Into<String>) -> Self {
        Self::Archive {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn no_valid_models(dataset: impl Into<String>, failures: Vec<String>) -> Self {
        Self::NoValidModels {
            dataset: dataset.into(),
            failures,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Replace the path of a format error, e.g. to report the uploaded
    /// filename instead of its scratch location. Other variants pass through.
    pub fn with_path(self, path: impl AsRef<Path>) -> Self {
        match self {
            Self::Format { message, .. } => Self::format(path, message),
            other => other,
        }
    }

    /// Whether the error was caused by the submitted input rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::Format { .. }
                | Self::Archive { .. }
                | Self::NoValidModels { .. }
        )
    }

    /// Message shown next to the upload form
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message } => message.clone(),
            Self::Format { path, message } => {
                format!("'{}' is not a valid feature model: {}", path, message)
            }
            Self::Archive { message } => format!("The ZIP file could not be read: {}", message),
            Self::NoValidModels { dataset, failures } if !failures.is_empty() => format!(
                "No valid files found in '{}': all {} feature model files failed to load ({})",
                dataset,
                failures.len(),
                failures.join("; ")
            ),
            Self::NoValidModels { dataset, .. } => format!(
                "No valid files found in '{}': the archive contains no .xml or .uvl feature models",
                dataset
            ),
            Self::Io { .. } | Self::Configuration { .. } | Self::Internal { .. } => {
                "The server could not process the request, please try again".to_string()
            }
        }
    }
}
