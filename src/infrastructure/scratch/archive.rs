//! ZIP extraction into scratch storage

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::domain::DomainError;

/// Extracts ZIP archives into fresh directories under the scratch directory
#[derive(Debug, Clone)]
pub struct ArchiveExtractor {
    scratch_dir: PathBuf,
}

impl ArchiveExtractor {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
        }
    }

    /// Extract every entry of the archive at `zip_path`.
    ///
    /// Member names are returned in archive index order. Two file entries
    /// extracting to the same path are rejected. On any error the partially
    /// populated directory is removed before returning.
    pub fn extract(&self, zip_path: &Path) -> Result<ExtractedArchive, DomainError> {
        let file = File::open(zip_path).map_err(|e| {
            DomainError::io(format!("Failed to open '{}': {}", zip_path.display(), e))
        })?;

        let mut archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| DomainError::archive(format!("not a valid ZIP file ({})", e)))?;

        let dir = tempfile::Builder::new()
            .prefix("dataset-")
            .tempdir_in(&self.scratch_dir)
            .map_err(|e| DomainError::io(format!("Failed to create extraction directory: {}", e)))?;

        let mut members = Vec::with_capacity(archive.len());
        let mut files = HashSet::new();

        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| DomainError::archive(format!("unreadable entry #{} ({})", index, e)))?;

            let name = entry.name().to_string();
            let relative = entry.enclosed_name().map(Path::to_path_buf).ok_or_else(|| {
                DomainError::archive(format!("entry '{}' points outside the archive", name))
            })?;
            let target = dir.path().join(&relative);

            if !entry.is_dir() && !files.insert(relative) {
                return Err(DomainError::archive(format!(
                    "entry '{}' appears more than once",
                    name
                )));
            }

            if entry.is_dir() {
                fs::create_dir_all(&target).map_err(|e| extraction_io(&name, e))?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| extraction_io(&name, e))?;
                }

                let mut output = File::create(&target).map_err(|e| extraction_io(&name, e))?;
                io::copy(&mut entry, &mut output).map_err(|e| {
                    DomainError::archive(format!("entry '{}' could not be extracted ({})", name, e))
                })?;
            }

            members.push(name);
        }

        debug!(
            archive = %zip_path.display(),
            directory = %dir.path().display(),
            members = members.len(),
            "Extracted archive"
        );

        Ok(ExtractedArchive {
            dir: Some(dir),
            members,
        })
    }
}

fn extraction_io(name: &str, error: io::Error) -> DomainError {
    DomainError::io(format!("Failed to extract '{}': {}", name, error))
}

/// An extracted archive; its directory is removed on `release` or drop
#[derive(Debug)]
pub struct ExtractedArchive {
    dir: Option<TempDir>,
    members: Vec<String>,
}

impl ExtractedArchive {
    /// Extraction root
    pub fn path(&self) -> &Path {
        match &self.dir {
            Some(dir) => dir.path(),
            None => Path::new(""),
        }
    }

    /// Entry names in archive index order
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Remove the directory now, logging failures
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();

            match dir.close() {
                Ok(()) => debug!(path = %path.display(), "Removed extraction directory"),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to remove extraction directory"),
            }
        }
    }
}

impl Drop for ExtractedArchive {
    fn drop(&mut self) {
        self.remove();
    }
}
