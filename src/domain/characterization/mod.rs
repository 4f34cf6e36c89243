//! Characterization domain types
//!
//! This module provides:
//! - `Characterizer` trait computing a report for a feature model
//! - The report, its metadata record and the rendered result forms

pub mod engine;
pub mod metadata;
pub mod report;
pub mod result;

pub use engine::Characterizer;
pub use metadata::{join_keywords, normalize_newlines, FmMetadata, MetadataForm};
pub use report::{FactValue, FmCharacterization, FmFact};
pub use result::CharacterizationResult;

#[cfg(test)]
pub use engine::MockCharacterizer;
