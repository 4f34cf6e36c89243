//! Dataset processing infrastructure

pub mod processor;

pub use processor::DatasetProcessor;
