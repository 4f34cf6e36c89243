//! Classification of upload requests

use crate::domain::DomainError;

use super::{FormKind, UploadRequest, UploadedFile};

/// What an accepted request asks for
#[derive(Debug, Clone)]
pub enum UploadKind {
    /// Characterize an uploaded model file
    Single(UploadedFile),
    /// Characterize a catalog example by name
    Example(String),
    /// Characterize every model in an uploaded ZIP archive
    Zip(UploadedFile),
}

impl UploadKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::Example(_) => "example",
            Self::Zip(_) => "dataset",
        }
    }
}

/// Pure classification of upload requests; performs no I/O
#[derive(Debug, Default, Clone, Copy)]
pub struct UploadValidator;

impl UploadValidator {
    /// Classify `request` or reject it with a message for the user
    pub fn classify(request: &UploadRequest) -> Result<UploadKind, DomainError> {
        match request.form {
            FormKind::Model => Self::classify_model(request),
            FormKind::Dataset => Self::classify_dataset(request),
        }
    }

    fn classify_model(request: &UploadRequest) -> Result<UploadKind, DomainError> {
        if let Some(file) = present(&request.model_file) {
            if file.filename.trim().is_empty() {
                return Err(DomainError::validation(
                    "The uploaded feature model has no file name",
                ));
            }

            return Ok(UploadKind::Single(file.clone()));
        }

        match request.example.as_deref().map(str::trim) {
            Some(example) if !example.is_empty() => Ok(UploadKind::Example(example.to_string())),
            _ => Err(DomainError::validation(
                "Please upload a feature model file or select an example model",
            )),
        }
    }

    fn classify_dataset(request: &UploadRequest) -> Result<UploadKind, DomainError> {
        let file = present(&request.zip_file)
            .ok_or_else(|| DomainError::validation("Please upload a ZIP file with feature models"))?;

        if !file.filename.to_lowercase().ends_with(".zip") {
            return Err(DomainError::validation(format!(
                "'{}' is not a ZIP file, please upload a file ending in .zip",
                file.filename
            )));
        }

        Ok(UploadKind::Zip(file.clone()))
    }
}

fn present(file: &Option<UploadedFile>) -> Option<&UploadedFile> {
    file.as_ref().filter(|f| !f.is_blank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn model_file(name: &str) -> UploadedFile {
        UploadedFile::new(name, Bytes::from_static(b"features\n    Root\n"))
    }

    #[test]
    fn test_empty_model_request_is_invalid() {
        let err = UploadValidator::classify(&UploadRequest::new(FormKind::Model)).unwrap_err();

        assert!(matches!(err, DomainError::Validation { .. }));
        assert!(!err.user_message().is_empty());
    }

    #[test]
    fn test_blank_file_and_blank_example_are_invalid() {
        let request = UploadRequest::new(FormKind::Model)
            .with_model_file(UploadedFile::new("", Bytes::new()))
            .with_example("  ");

        assert!(UploadValidator::classify(&request).is_err());
    }

    #[test]
    fn test_single_upload() {
        let request = UploadRequest::new(FormKind::Model).with_model_file(model_file("m.uvl"));

        match UploadValidator::classify(&request).unwrap() {
            UploadKind::Single(file) => assert_eq!(file.filename, "m.uvl"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_uploaded_file_wins_over_example() {
        let request = UploadRequest::new(FormKind::Model)
            .with_model_file(model_file("m.uvl"))
            .with_example("Pizzas");

        assert!(matches!(
            UploadValidator::classify(&request).unwrap(),
            UploadKind::Single(_)
        ));
    }

    #[test]
    fn test_example_selection() {
        let request = UploadRequest::new(FormKind::Model)
            .with_model_file(UploadedFile::new("", Bytes::new()))
            .with_example("Pizzas");

        match UploadValidator::classify(&request).unwrap() {
            UploadKind::Example(name) => assert_eq!(name, "Pizzas"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_zip_suffix_is_case_insensitive() {
        let request = UploadRequest::new(FormKind::Dataset).with_zip_file(model_file("MODELS.ZIP"));

        let kind = UploadValidator::classify(&request).unwrap();
        assert_eq!(kind.label(), "dataset");
    }

    #[test]
    fn test_zip_with_wrong_suffix_is_invalid() {
        let request = UploadRequest::new(FormKind::Dataset).with_zip_file(model_file("models.tar.gz"));

        let err = UploadValidator::classify(&request).unwrap_err();
        assert!(err.user_message().contains("models.tar.gz"));
    }

    #[test]
    fn test_missing_zip_is_invalid() {
        let request = UploadRequest::new(FormKind::Dataset).with_model_file(model_file("m.uvl"));

        assert!(UploadValidator::classify(&request).is_err());
    }
}
