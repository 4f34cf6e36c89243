//! Application state for shared services

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::catalog::ExampleCatalog;
use crate::domain::characterization::CharacterizationResult;
use crate::domain::dataset::DatasetResult;
use crate::domain::upload::UploadRequest;
use crate::infrastructure::services::{CharacterizationService, RequestFailure};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub characterization_service: Arc<dyn CharacterizationServiceTrait>,
    /// Read-only example catalog shown on the upload page
    pub catalog: Arc<ExampleCatalog>,
}

/// Trait for characterization service operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CharacterizationServiceTrait: Send + Sync {
    async fn characterize_model(
        &self,
        request: UploadRequest,
    ) -> Result<CharacterizationResult, RequestFailure>;

    async fn characterize_dataset(
        &self,
        request: UploadRequest,
    ) -> Result<DatasetResult, RequestFailure>;

    /// Whether scratch storage currently accepts new files
    fn scratch_ready(&self) -> bool;
}

#[async_trait]
impl CharacterizationServiceTrait for CharacterizationService {
    async fn characterize_model(
        &self,
        request: UploadRequest,
    ) -> Result<CharacterizationResult, RequestFailure> {
        CharacterizationService::characterize_model(self, request).await
    }

    async fn characterize_dataset(
        &self,
        request: UploadRequest,
    ) -> Result<DatasetResult, RequestFailure> {
        CharacterizationService::characterize_dataset(self, request).await
    }

    fn scratch_ready(&self) -> bool {
        CharacterizationService::scratch_ready(self)
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        characterization_service: Arc<dyn CharacterizationServiceTrait>,
        catalog: Arc<ExampleCatalog>,
    ) -> Self {
        Self {
            characterization_service,
            catalog,
        }
    }
}
