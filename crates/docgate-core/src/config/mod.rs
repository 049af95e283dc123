//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod logging;
pub mod plugin;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub use self::logging::LoggingConfig;
pub use self::plugin::PluginSpec;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::Verb;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Per-collection settings keyed by collection name.
    #[serde(default)]
    pub collections: HashMap<String, CollectionConfig>,
}

/// Settings for one hooked collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Verbs this collection allows. `None` allows every verb.
    #[serde(default)]
    pub allowed_methods: Option<Vec<String>>,
    /// Plugins applied to the collection, in order.
    #[serde(default)]
    pub plugins: Vec<PluginSpec>,
}

impl CollectionConfig {
    /// Parses the allow-list into verbs.
    ///
    /// Fails on unknown or deprecated method names so that a typo never
    /// silently disables a verb.
    pub fn allowed_verbs(&self) -> AppResult<Option<Vec<Verb>>> {
        self.allowed_methods
            .as_ref()
            .map(|names| names.iter().map(|n| n.parse::<Verb>()).collect())
            .transpose()
    }
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `DOCGATE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        debug!(env = %env, "Loading configuration");

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("DOCGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        info!(
            env = %env,
            collections = loaded.collections.len(),
            "Configuration loaded"
        );
        Ok(loaded)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(source: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Returns the settings for a collection, or the defaults.
    pub fn collection(&self, name: &str) -> CollectionConfig {
        self.collections.get(name).cloned().unwrap_or_default()
    }
}
