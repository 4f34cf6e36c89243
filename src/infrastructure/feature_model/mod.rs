//! Feature model reading infrastructure
//!
//! This module provides the per-format parsers, the factory selecting one
//! by file extension, and the ingester reading model files from disk.

pub mod factory;
pub mod ingester;
pub mod parsers;

pub use factory::ParserFactory;
pub use ingester::ModelIngester;
pub use parsers::{FeatureIdeParser, UvlParser};
