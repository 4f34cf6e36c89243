//! Runs the characterization engine and applies report metadata

use std::sync::Arc;

use tracing::debug;

use crate::domain::characterization::{
    CharacterizationResult, Characterizer, FmMetadata, MetadataForm,
};
use crate::domain::feature_model::FeatureModel;
use crate::domain::DomainError;

/// Characterizes one model and produces its result forms
#[derive(Clone)]
pub struct CharacterizationInvoker {
    engine: Arc<dyn Characterizer>,
}

impl std::fmt::Debug for CharacterizationInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharacterizationInvoker").finish()
    }
}

impl CharacterizationInvoker {
    pub fn new(engine: Arc<dyn Characterizer>) -> Self {
        Self { engine }
    }

    /// Characterize `model`.
    ///
    /// `defaults` come from the example catalog or the file name; non-blank
    /// `form` fields replace them.
    pub fn characterize(
        &self,
        model: &FeatureModel,
        defaults: FmMetadata,
        form: &MetadataForm,
    ) -> Result<CharacterizationResult, DomainError> {
        let mut metadata = defaults;
        metadata.apply_form(form);

        let mut report = self.engine.characterize(model, &metadata.name)?;
        report.metadata = metadata;

        debug!(
            name = %report.metadata.name,
            metrics = report.metrics.len(),
            analysis = report.analysis.len(),
            "Characterized feature model"
        );

        CharacterizationResult::from_report(&report)
    }
}
