//! Infrastructure layer - Parsers, scratch storage and request pipeline

pub mod catalog;
pub mod characterization;
pub mod dataset;
pub mod feature_model;
pub mod logging;
pub mod observability;
pub mod scratch;
pub mod services;
