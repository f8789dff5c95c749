//! Configuration management.
//!
//! Configuration is read from a JSON file and then overridden from the
//! environment. Nothing here is global: the loaded [`Config`] is passed
//! explicitly to whoever needs it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cursorauth_core::DEFAULT_CLIENT_VERSION;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::StoreError;
use crate::paths::{cursor_state_db_path, default_config_path, default_token_path};
use crate::token_store::CARD_FILE_NAME;

// ============================================================================
// Environment Overrides
// ============================================================================

/// Base URL of the provisioning service.
pub const API_BASE_URL_ENV: &str = "API_BASE_URL";

/// Token file location override.
pub const TOKEN_PATH_ENV: &str = "CURSORAUTH_TOKEN_PATH";

/// Cursor state database location override.
pub const STATE_DB_ENV: &str = "CURSORAUTH_STATE_DB";

/// Enables the transactional commit mode.
pub const TRANSACTIONAL_ENV: &str = "CURSORAUTH_TRANSACTIONAL";

// ============================================================================
// Config
// ============================================================================

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Provisioning service base URL, e.g. `https://host/api`.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Client version reported to the provisioning service.
    #[serde(default = "default_client_version")]
    pub client_version: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Token file override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,
    /// Cursor state database override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_db_path: Option<PathBuf>,
    /// Clear and write credentials in one transaction.
    #[serde(default)]
    pub transactional_commit: bool,
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:8000/api".to_string()
}

fn default_client_version() -> String {
    DEFAULT_CLIENT_VERSION.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            client_version: default_client_version(),
            request_timeout_secs: default_request_timeout(),
            token_path: None,
            state_db_path: None,
            transactional_commit: false,
        }
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads the default config file and applies environment overrides.
    pub fn load() -> Result<Self, StoreError> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(API_BASE_URL_ENV) {
            debug!(source = API_BASE_URL_ENV, "Overriding API base URL");
            self.api_base_url = url;
        }
        if let Some(path) = lookup(TOKEN_PATH_ENV) {
            self.token_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup(STATE_DB_ENV) {
            self.state_db_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup(TRANSACTIONAL_ENV) {
            self.transactional_commit =
                matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<(), StoreError> {
        let url = Url::parse(&self.api_base_url)
            .map_err(|e| StoreError::Config(format!("invalid api_base_url: {e}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(StoreError::Config(format!(
                "api_base_url must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(StoreError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns the base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Returns the HTTP request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolves the token file path.
    pub fn token_path(&self) -> Result<PathBuf, StoreError> {
        match &self.token_path {
            Some(path) => Ok(path.clone()),
            None => default_token_path().ok_or(StoreError::NoPath("token file")),
        }
    }

    /// Resolves the saved card path, a sibling of the token file.
    pub fn card_path(&self) -> Result<PathBuf, StoreError> {
        Ok(self.token_path()?.with_file_name(CARD_FILE_NAME))
    }

    /// Resolves the Cursor state database path.
    pub fn state_db_path(&self) -> Result<PathBuf, StoreError> {
        match &self.state_db_path {
            Some(path) => Ok(path.clone()),
            None => cursor_state_db_path().ok_or(StoreError::NoPath("Cursor state database")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
