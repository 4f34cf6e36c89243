//! Characterization infrastructure

pub mod invoker;
pub mod structural;

pub use invoker::CharacterizationInvoker;
pub use structural::StructuralCharacterizer;
