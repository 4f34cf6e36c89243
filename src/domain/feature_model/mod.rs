//! Feature model domain types
//!
//! This module provides:
//! - The feature tree and cross-tree constraint entities
//! - `FeatureModelParser` trait implemented once per file format

pub mod entity;
pub mod parser;

pub use entity::{
    Constraint, ConstraintKind, Feature, FeatureModel, FeatureVisit, Formula, Relation,
    RelationKind,
};
pub use parser::{FeatureModelParser, ModelFormat, ModelInput, MAX_NESTING_DEPTH};
