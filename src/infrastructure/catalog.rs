//! Example catalog loading

use tracing::{info, warn};

use crate::config::CatalogConfig;
use crate::domain::catalog::ExampleCatalog;
use crate::domain::DomainError;

/// Load the configured catalog file, or the built-in catalog when none is set.
///
/// Examples whose file is missing from `models_dir` are kept but logged.
pub fn load_catalog(config: &CatalogConfig) -> Result<ExampleCatalog, DomainError> {
    let catalog = match &config.path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                DomainError::configuration(format!(
                    "Failed to read example catalog '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            ExampleCatalog::from_toml_str(&content)?
        }
        None => ExampleCatalog::builtin(),
    };

    for example in catalog.iter() {
        if !config.models_dir.join(&example.filename).is_file() {
            warn!(
                example = %example.name,
                filename = %example.filename,
                models_dir = %config.models_dir.display(),
                "Example model file not found"
            );
        }
    }

    info!(examples = catalog.len(), "Loaded example catalog");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_when_no_path() {
        let config = CatalogConfig {
            models_dir: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/models")),
            path: None,
        };

        let catalog = load_catalog(&config).unwrap();
        assert_eq!(catalog.len(), ExampleCatalog::builtin().len());
    }

    #[test]
    fn test_loads_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.toml");
        std::fs::write(
            &path,
            "[[examples]]\nname = \"Mine\"\nfilename = \"mine.uvl\"\nauthor = \"A\"\n",
        )
        .unwrap();

        let config = CatalogConfig {
            models_dir: dir.path().to_path_buf(),
            path: Some(path),
        };

        let catalog = load_catalog(&config).unwrap();
        assert_eq!(catalog.get("Mine").unwrap().author, "A");
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let config = CatalogConfig {
            models_dir: dir.path().to_path_buf(),
            path: Some(dir.path().join("missing.toml")),
        };

        let err = load_catalog(&config).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }
}
