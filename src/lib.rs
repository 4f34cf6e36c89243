//! FM Fact Label
//!
//! Web service that characterizes feature models:
//! - Single `.uvl` (UVL) and `.xml` (FeatureIDE) uploads
//! - Built-in example models with default metadata
//! - ZIP datasets characterized member by member

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod testing;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::{
    catalog::load_catalog,
    characterization::{CharacterizationInvoker, StructuralCharacterizer},
    scratch::TempFileManager,
    services::CharacterizationService,
};
use tracing::info;

/// Build the characterization pipeline from configuration
pub fn create_characterization_service(
    config: &AppConfig,
) -> anyhow::Result<CharacterizationService> {
    let catalog = load_catalog(&config.catalog)?;
    let temp_files = TempFileManager::new(&config.upload.scratch_dir)?;
    let invoker = CharacterizationInvoker::new(Arc::new(StructuralCharacterizer::new()));

    info!(
        scratch_dir = %config.upload.scratch_dir.display(),
        models_dir = %config.catalog.models_dir.display(),
        "Characterization service initialized"
    );

    Ok(CharacterizationService::new(
        Arc::new(catalog),
        &config.catalog.models_dir,
        temp_files,
        invoker,
    ))
}

/// Create the application state with all services initialized
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let service = create_characterization_service(config)?;
    let catalog = service.catalog_handle();

    Ok(AppState::new(Arc::new(service), catalog))
}
