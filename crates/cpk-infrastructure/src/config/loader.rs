//! Configuration loader
//!
//! Merges configuration from defaults, an optional TOML file, and
//! `CPK_`-prefixed environment variables, then validates the result once.
//! Later sources override earlier ones.

use std::env;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::{info, warn};

use cpk_domain::error::{Error, Result};

use crate::error_ext::ErrorContext;

use super::{PlatformConfig, CONFIG_ENV_PREFIX, DEFAULT_CONFIG_FILENAME};

/// Configuration loader service.
#[derive(Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl ConfigLoader {
    /// Create a loader with default settings.
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: CONFIG_ENV_PREFIX.to_string(),
        }
    }

    /// Set the configuration file path.
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set the environment variable prefix.
    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Load configuration from all sources.
    ///
    /// Sources are merged in this order (later overrides earlier):
    /// 1. Default values from `PlatformConfig::default()`
    /// 2. TOML configuration file (if present)
    /// 3. Environment variables with prefix (e.g. `CPK_PLATFORM_REALM`)
    pub fn load(&self) -> Result<PlatformConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(PlatformConfig::default()));

        if let Some(config_path) = &self.config_path {
            if config_path.exists() {
                figment = figment.merge(Toml::file(config_path));
                info!("Configuration loaded from {}", config_path.display());
            } else {
                warn!("Configuration file not found: {}", config_path.display());
            }
        } else if let Ok(current_dir) = env::current_dir() {
            let default_path = current_dir.join(DEFAULT_CONFIG_FILENAME);
            if default_path.exists() {
                figment = figment.merge(Toml::file(&default_path));
                info!("Configuration loaded from {}", default_path.display());
            }
        }

        figment = figment.merge(Env::prefixed(&format!("{}_", self.env_prefix)).split("_"));

        let config: PlatformConfig = figment
            .extract()
            .context("Failed to extract configuration")?;

        validate_config(&config)?;

        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, config: &PlatformConfig, path: P) -> Result<()> {
        let toml_string =
            toml::to_string_pretty(config).context("Failed to serialize config to TOML")?;
        std::fs::write(path.as_ref(), toml_string).context("Failed to write config file")?;
        Ok(())
    }

    /// The configured file path, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate the merged configuration before anything is built from it.
fn validate_config(config: &PlatformConfig) -> Result<()> {
    if config.platform.realm.trim().is_empty() {
        return Err(Error::configuration("Platform realm cannot be empty"));
    }
    if config.resolver.tier_timeout_ms == 0 {
        return Err(Error::configuration("Resolver tier timeout cannot be 0"));
    }
    for (name, adapter) in &config.adapters {
        if adapter.provider.trim().is_empty() {
            return Err(Error::configuration(format!(
                "Adapter '{name}' has no provider"
            )));
        }
    }
    for (name, abstraction) in &config.abstractions {
        if abstraction.adapters.is_empty() {
            return Err(Error::configuration(format!(
                "Abstraction '{name}' must reference at least one adapter"
            )));
        }
        if abstraction.contract.trim().is_empty() {
            return Err(Error::configuration(format!(
                "Abstraction '{name}' has no contract identifier"
            )));
        }
        for adapter_ref in &abstraction.adapters {
            if !config.adapters.contains_key(adapter_ref) {
                return Err(Error::configuration(format!(
                    "Abstraction '{name}' references unknown adapter '{adapter_ref}'"
                )));
            }
        }
    }
    Ok(())
}
