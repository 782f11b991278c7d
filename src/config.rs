//! Layered service configuration.
//!
//! Defaults, then an optional file, then `CATALOG__SECTION__KEY` environment
//! variables.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::product_service::ReferencePolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub catalog: CatalogSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub listen_addr: String,
    pub preserve_references: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    pub database_url: String,
    pub max_connections: u32,
    /// Request queue depth of the in-memory store actor.
    pub actor_buffer: usize,
    pub seed_demo_data: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    pub reference_policy: ReferencePolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5161".to_string(),
            preserve_references: false,
        }
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            database_url: "sqlite::memory:".to_string(),
            max_connections: 5,
            actor_buffer: 32,
            seed_demo_data: false,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Prefix of the environment layer, as in `CATALOG__STORE__BACKEND=sqlite`.
const ENV_PREFIX: &str = "CATALOG";

impl CatalogConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    fn load_with_env_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "server.listen_addr must not be empty".to_string(),
            });
        }
        if self.store.max_connections == 0 {
            return Err(ConfigError::Validation {
                message: "store.max_connections must be greater than 0".to_string(),
            });
        }
        if self.store.actor_buffer == 0 {
            return Err(ConfigError::Validation {
                message: "store.actor_buffer must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}
