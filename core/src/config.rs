//! Client configuration.
//!
//! Sources are merged in this order (later sources override earlier):
//! 1. Defaults from `ClientConfig::default()`
//! 2. A TOML file (`portal.toml` in the working directory, or an explicit path)
//! 3. Environment variables prefixed `BACKEND_` (e.g. `BACKEND_URL`)
//!
//! The result is resolved once at startup and handed to the client; nothing
//! here is global.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";
pub const ENV_PREFIX: &str = "BACKEND_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Load(Box::new(err))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root URL every endpoint is joined onto.
    pub base_url: String,
    /// Per-request deadline. Unset means requests wait for the transport.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load from the default sources.
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Extract and validate from an already assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: ClientConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got {url}"
            )));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("timeout_secs must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Assembles the configuration sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_path: None,
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn with_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(ClientConfig::default()));

        let path = self
            .config_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        if path.exists() {
            debug!(path = %path.display(), "loading configuration file");
            figment = figment.merge(Toml::file(&path));
        } else if self.config_path.is_some() {
            debug!(path = %path.display(), "configuration file not found, skipping");
        }

        // BACKEND_URL reads better than BACKEND_BASE_URL.
        figment.merge(Env::prefixed(&self.env_prefix).map(|key| {
            if key.as_str().eq_ignore_ascii_case("url") {
                "base_url".into()
            } else {
                key.as_str().to_ascii_lowercase().into()
            }
        }))
    }

    pub fn load(&self) -> Result<ClientConfig, ConfigError> {
        let config = ClientConfig::from_figment(self.figment())?;
        debug!(base_url = %config.base_url, timeout_secs = ?config.timeout_secs, "configuration loaded");
        Ok(config)
    }
}
