//! Domain layer - Feature models, characterization reports and upload handling

pub mod catalog;
pub mod characterization;
pub mod dataset;
pub mod error;
pub mod feature_model;
pub mod upload;

pub use catalog::{ExampleCatalog, ExampleModel};
pub use characterization::{
    CharacterizationResult, Characterizer, FactValue, FmCharacterization, FmFact, FmMetadata,
    MetadataForm,
};
pub use dataset::{DatasetEntry, DatasetFailure, DatasetResult};
pub use error::DomainError;
pub use feature_model::{
    Constraint, ConstraintKind, Feature, FeatureModel, FeatureModelParser, Formula, ModelFormat,
    ModelInput, Relation, RelationKind,
};
pub use upload::{FormKind, UploadKind, UploadRequest, UploadValidator, UploadedFile};
