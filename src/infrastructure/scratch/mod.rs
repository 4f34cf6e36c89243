//! Scratch storage for per-request temporary artifacts
//!
//! Every artifact is owned by a guard (`TempUpload`, `ExtractedArchive`)
//! that removes it when released or dropped.

pub mod archive;
pub mod temp_files;

pub use archive::{ArchiveExtractor, ExtractedArchive};
pub use temp_files::{TempFileManager, TempUpload};
