//! Configuration module for appcycle-server.
//!
//! Loads the TOML file, applies CLI overrides and decodes the application
//! definition it points at.

pub mod file;

use crate::config::file::FileConfig;
use appcycle_sdk::config::{AppDefinition, DispatcherConfig};
use appcycle_sdk::marshal::{MarshalError, Marshaler};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("failed to decode definition {path:?}: {source}")]
    DefinitionError { path: PathBuf, source: MarshalError },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Everything the server needs to build a dispatcher.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub dispatcher: DispatcherConfig,
    pub definition: AppDefinition,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Decode the application definition
    /// 4. Validate the result
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = read(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        let definition_path = self.definition_path(&file_config.definition);
        let definition = load_definition(&definition_path)?;
        let dispatcher = file_config.dispatcher.into_config();
        validate(&dispatcher, &definition)?;

        Ok(LoadedConfig {
            listen: file_config.server.listen,
            dispatcher,
            definition,
        })
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }

    fn definition_path(&self, definition: &Path) -> PathBuf {
        match self.config_path.parent() {
            Some(dir) if definition.is_relative() => dir.join(definition),
            _ => definition.to_path_buf(),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })
}

/// Decode a definition file; `.yaml`/`.yml` are YAML, anything else JSON.
fn load_definition(path: &Path) -> Result<AppDefinition, ConfigError> {
    let marshaler = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml" | "yml") => Marshaler::yaml(),
        _ => Marshaler::json(),
    };
    marshaler
        .decode(&read(path)?)
        .map_err(|source| ConfigError::DefinitionError {
            path: path.to_path_buf(),
            source,
        })
}

fn validate(dispatcher: &DispatcherConfig, definition: &AppDefinition) -> Result<(), ConfigError> {
    url::Url::parse(&definition.target_url).map_err(|e| {
        ConfigError::ValidationError(format!(
            "targetUrl {:?} is not a URL: {e}",
            definition.target_url
        ))
    })?;
    if dispatcher.check_signatures {
        url::Url::parse(&dispatcher.keyserver_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "keyserver_url {:?} is not a URL: {e}",
                dispatcher.keyserver_url
            ))
        })?;
    }
    Ok(())
}
