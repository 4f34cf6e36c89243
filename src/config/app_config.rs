use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Scratch storage and request size limits
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

/// Example model catalog location
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Directory the example filenames are resolved against
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,
    /// TOML catalog file; the built-in catalog is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_level() -> String {
    "info".to_string()
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("fm-fact-label")
}

fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("resources/models")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            path: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Address the server binds to
    pub fn bind_address(&self) -> Result<SocketAddr, DomainError> {
        let host = self.server.host.parse::<IpAddr>().map_err(|e| {
            DomainError::configuration(format!("Invalid server host '{}': {}", self.server.host, e))
        })?;

        Ok(SocketAddr::from((host, self.server.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.bind_address().unwrap().to_string(), "0.0.0.0:5000");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.upload.max_upload_bytes, 32 * 1024 * 1024);
        assert!(config.upload.scratch_dir.ends_with("fm-fact-label"));
        assert_eq!(config.catalog.models_dir, PathBuf::from("resources/models"));
        assert!(config.catalog.path.is_none());
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[server]\nport = 9000\n\n[logging]\nformat = \"json\"\n\n[upload]\nmax_upload_bytes = 1024\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.bind_address().unwrap().to_string(), "0.0.0.0:9000");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.upload.max_upload_bytes, 1024);
        assert_eq!(config.metrics.path, "/metrics");
    }

    #[test]
    fn test_bind_address_rejects_invalid_host() {
        let mut config = AppConfig::default();
        config.server.host = "not-an-ip".to_string();

        let err = config.bind_address().unwrap_err();
        assert!(err.to_string().contains("not-an-ip"));
    }

    #[test]
    fn test_bind_address_accepts_ipv6() {
        let mut config = AppConfig::default();
        config.server.host = "::1".to_string();

        assert_eq!(config.bind_address().unwrap().to_string(), "[::1]:5000");
    }
}
