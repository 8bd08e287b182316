//! Client configuration.
//!
//! Configuration can be loaded from:
//! - a TOML file (default: ~/.config/nyayneti/client.toml)
//! - environment variables (NYAYNETI_* prefixed)
//!
//! # Example
//!
//! ```rust,no_run
//! use nyayneti_client::config::ClientConfig;
//!
//! // Load from default path or fall back to env vars
//! let config = ClientConfig::load().expect("Failed to load config");
//!
//! // Or explicitly from a file
//! let config = ClientConfig::from_file(std::path::Path::new("client.toml")).expect("Failed to load");
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use nyayneti_core::defaults;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

impl From<ConfigError> for nyayneti_core::Error {
    fn from(e: ConfigError) -> Self {
        nyayneti_core::Error::Config(e.to_string())
    }
}

/// Connection settings for the drafting backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend API (without the `/api` suffix).
    pub base_url: String,
    /// Timeout for catalog requests (seconds).
    #[serde(default = "ClientConfig::default_timeout")]
    pub timeout_secs: u64,
    /// Timeout for context analysis (seconds).
    #[serde(default = "ClientConfig::default_analyze_timeout")]
    pub analyze_timeout_secs: u64,
    /// Timeout for draft generation (seconds).
    #[serde(default = "ClientConfig::default_generate_timeout")]
    pub generate_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::API_URL.to_string(),
            timeout_secs: Self::default_timeout(),
            analyze_timeout_secs: Self::default_analyze_timeout(),
            generate_timeout_secs: Self::default_generate_timeout(),
        }
    }
}

impl ClientConfig {
    fn default_timeout() -> u64 {
        defaults::TIMEOUT_SECS
    }

    fn default_analyze_timeout() -> u64 {
        defaults::ANALYZE_TIMEOUT_SECS
    }

    fn default_generate_timeout() -> u64 {
        defaults::GENERATE_TIMEOUT_SECS
    }

    /// Create a configuration pointing at `base_url` with default timeouts.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Get the default config file path.
    ///
    /// Returns: ~/.config/nyayneti/client.toml
    pub fn default_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        path.push("nyayneti");
        path.push("client.toml");
        path
    }

    /// Load configuration from the default path, falling back to environment variables.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_config_path();

        if path.exists() {
            info!("Loading client config from: {}", path.display());
            Self::from_file(&path)
        } else {
            debug!(
                "Config file not found at {}, using environment variables",
                path.display()
            );
            let config = Self::from_env();
            config.validate()?;
            Ok(config)
        }
    }

    /// Load configuration from a TOML file with a `[client]` table.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text, substituting `${VAR}` references.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let content = Self::substitute_env_vars(content);

        #[derive(Deserialize)]
        struct TomlRoot {
            client: ClientConfig,
        }

        let root: TomlRoot = toml::from_str(&content)?;
        root.client.validate()?;
        Ok(root.client)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |name: &str, default: u64| {
            lookup(name)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Self {
            base_url: lookup("NYAYNETI_API_URL").unwrap_or_else(|| defaults::API_URL.to_string()),
            timeout_secs: secs("NYAYNETI_TIMEOUT_SECS", defaults::TIMEOUT_SECS),
            analyze_timeout_secs: secs(
                "NYAYNETI_ANALYZE_TIMEOUT_SECS",
                defaults::ANALYZE_TIMEOUT_SECS,
            ),
            generate_timeout_secs: secs(
                "NYAYNETI_GENERATE_TIMEOUT_SECS",
                defaults::GENERATE_TIMEOUT_SECS,
            ),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "base_url cannot be empty".to_string(),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }

        for (name, value) in [
            ("timeout_secs", self.timeout_secs),
            ("analyze_timeout_secs", self.analyze_timeout_secs),
            ("generate_timeout_secs", self.generate_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Validation(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Substitute environment variables in the format ${VAR_NAME}.
    fn substitute_env_vars(content: &str) -> String {
        let re = regex::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("valid pattern");
        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}
