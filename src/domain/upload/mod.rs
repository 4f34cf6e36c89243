//! Upload request types and classification

pub mod validation;

use bytes::Bytes;

pub use crate::domain::characterization::MetadataForm;
pub use validation::{UploadKind, UploadValidator};

/// Which form the request was submitted through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    /// Single model or example selection (`POST /`)
    Model,
    /// ZIP archive of models (`POST /upload_zip`)
    Dataset,
}

/// A file part of the submitted form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Browsers submit an unnamed, empty part for untouched file inputs
    pub fn is_blank(&self) -> bool {
        self.filename.trim().is_empty() && self.bytes.is_empty()
    }

    /// File name without directories or extension
    pub fn stem(&self) -> String {
        file_stem(&self.filename)
    }
}

/// Base name of `path` without its extension, accepting `/` and `\` separators
pub fn file_stem(path: &str) -> String {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);

    match base.rfind('.') {
        Some(index) if index > 0 => base[..index].to_string(),
        _ => base.to_string(),
    }
}

/// Per-request upload data, discarded once the response is produced
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub form: FormKind,
    pub model_file: Option<UploadedFile>,
    pub zip_file: Option<UploadedFile>,
    pub example: Option<String>,
    pub metadata: MetadataForm,
}

impl UploadRequest {
    pub fn new(form: FormKind) -> Self {
        Self {
            form,
            model_file: None,
            zip_file: None,
            example: None,
            metadata: MetadataForm::default(),
        }
    }

    pub fn with_model_file(mut self, file: UploadedFile) -> Self {
        self.model_file = Some(file);
        self
    }

    pub fn with_zip_file(mut self, file: UploadedFile) -> Self {
        self.zip_file = Some(file);
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_metadata(mut self, metadata: MetadataForm) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("model.uvl"), "model");
        assert_eq!(file_stem("dir/sub/car.xml"), "car");
        assert_eq!(file_stem("C:\\models\\car.v2.xml"), "car.v2");
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_blank_file() {
        assert!(UploadedFile::new("", Bytes::new()).is_blank());
        assert!(!UploadedFile::new("a.uvl", Bytes::new()).is_blank());
        assert!(!UploadedFile::new("", Bytes::from_static(b"x")).is_blank());
    }
}
