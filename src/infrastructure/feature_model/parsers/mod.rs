//! Feature model parser implementations

mod featureide;
mod uvl;

pub use featureide::FeatureIdeParser;
pub use uvl::UvlParser;
