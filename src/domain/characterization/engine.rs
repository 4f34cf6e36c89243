//! Characterization engine trait

#[cfg(test)]
use mockall::automock;

use crate::domain::feature_model::FeatureModel;
use crate::domain::DomainError;

use super::report::FmCharacterization;

/// Computes the characterization report of a feature model
#[cfg_attr(test, automock)]
pub trait Characterizer: Send + Sync {
    /// Characterize `model`; the report metadata carries `name` and is
    /// otherwise empty
    fn characterize(&self, model: &FeatureModel, name: &str)
    -> Result<FmCharacterization, DomainError>;
}
