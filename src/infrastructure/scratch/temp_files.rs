//! Request-scoped temporary files in scratch storage

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::domain::DomainError;

/// Writes uploaded bytes to uniquely named files in the scratch directory
#[derive(Debug, Clone)]
pub struct TempFileManager {
    scratch_dir: PathBuf,
}

impl TempFileManager {
    /// Use `scratch_dir` for temporary files, creating it if needed
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let scratch_dir = scratch_dir.into();

        std::fs::create_dir_all(&scratch_dir).map_err(|e| {
            DomainError::io(format!(
                "Failed to create scratch directory '{}': {}",
                scratch_dir.display(),
                e
            ))
        })?;

        Ok(Self { scratch_dir })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Write `bytes` to a new file named after `suggested_name`'s extension.
    ///
    /// The file lives until the returned guard is released or dropped.
    pub fn materialize(&self, bytes: &[u8], suggested_name: &str) -> Result<TempUpload, DomainError> {
        let suffix = extension_suffix(suggested_name);

        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.scratch_dir)
            .map_err(|e| DomainError::io(format!("Failed to create temporary file: {}", e)))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| DomainError::io(format!("Failed to write temporary file: {}", e)))?;

        debug!(
            path = %file.path().display(),
            original = suggested_name,
            size = bytes.len(),
            "Materialized upload"
        );

        Ok(TempUpload {
            file: Some(file),
            original_name: suggested_name.to_string(),
        })
    }

    /// Whether a file can currently be created in the scratch directory
    pub fn is_writable(&self) -> bool {
        tempfile::tempfile_in(&self.scratch_dir).is_ok()
    }
}

/// `.ext` of a file name, restricted to alphanumeric extensions
fn extension_suffix(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    Path::new(base)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_lowercase()))
        .unwrap_or_default()
}

/// A materialized upload, deleted on `release` or drop
#[derive(Debug)]
pub struct TempUpload {
    file: Option<NamedTempFile>,
    original_name: String,
}

impl TempUpload {
    /// Location in scratch storage
    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }

    /// Name the file was uploaded as
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    /// Delete the file now, logging failures
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();

            match file.close() {
                Ok(()) => debug!(path = %path.display(), "Removed temporary upload"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove temporary upload"),
            }
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_materialize_keeps_extension() {
        let scratch = TempDir::new().unwrap();
        let manager = TempFileManager::new(scratch.path()).unwrap();

        let upload = manager.materialize(b"features\n    A\n", "My Model.UVL").unwrap();

        assert!(upload.path().starts_with(scratch.path()));
        assert_eq!(upload.path().extension().unwrap(), "uvl");
        assert_eq!(upload.original_name(), "My Model.UVL");
        assert_eq!(std::fs::read(upload.path()).unwrap(), b"features\n    A\n");
    }

    #[test]
    fn test_same_name_gets_distinct_paths() {
        let scratch = TempDir::new().unwrap();
        let manager = TempFileManager::new(scratch.path()).unwrap();

        let first = manager.materialize(b"a", "model.uvl").unwrap();
        let second = manager.materialize(b"b", "model.uvl").unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(std::fs::read(first.path()).unwrap(), b"a");
        assert_eq!(std::fs::read(second.path()).unwrap(), b"b");
    }

    #[test]
    fn test_release_removes_file() {
        let scratch = TempDir::new().unwrap();
        let manager = TempFileManager::new(scratch.path()).unwrap();

        let upload = manager.materialize(b"x", "m.xml").unwrap();
        let path = upload.path().to_path_buf();
        upload.release();

        assert!(!path.exists());
        assert_eq!(entries(scratch.path()), 0);
    }

    #[test]
    fn test_drop_removes_file() {
        let scratch = TempDir::new().unwrap();
        let manager = TempFileManager::new(scratch.path()).unwrap();

        {
            let _upload = manager.materialize(b"x", "m.xml").unwrap();
            assert_eq!(entries(scratch.path()), 1);
        }

        assert_eq!(entries(scratch.path()), 0);
    }

    #[test]
    fn test_creates_missing_scratch_dir() {
        let parent = TempDir::new().unwrap();
        let scratch = parent.path().join("nested").join("scratch");

        let manager = TempFileManager::new(&scratch).unwrap();
        assert!(scratch.is_dir());
        assert!(manager.is_writable());
        assert_eq!(entries(&scratch), 0);
    }

    #[test]
    fn test_extension_suffix() {
        assert_eq!(extension_suffix("a/b/model.XML"), ".xml");
        assert_eq!(extension_suffix("C:\\x\\model.uvl"), ".uvl");
        assert_eq!(extension_suffix("noext"), "");
        assert_eq!(extension_suffix("weird.u v/l"), "");
        assert_eq!(extension_suffix("evil.x$y"), "");
    }
}
