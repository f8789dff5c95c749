//! CLI command implementations.

pub mod activate;
pub mod clear;
pub mod paths;
pub mod status;
pub mod sync;
pub mod token;

use anyhow::{Context, Result};
use cursorauth_fetch::ServiceHttp;
use cursorauth_store::{CardStore, Config, CredentialStateStore, TokenStore};
use tracing::debug;

use crate::Cli;

/// Loads configuration from `--config` or the default location, with
/// environment overrides applied.
pub fn load_config(cli: &Cli) -> Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            config.apply_env();
            config.validate()?;
            config
        }
        None => Config::load().context("Failed to load config")?,
    };

    debug!(api = config.api_base(), transactional = config.transactional_commit, "Config loaded");
    Ok(config)
}

/// Opens the token file named by the config.
pub fn token_store(config: &Config) -> Result<TokenStore> {
    Ok(TokenStore::new(config.token_path()?))
}

/// Opens the saved card file next to the token.
pub fn card_store(config: &Config) -> Result<CardStore> {
    Ok(CardStore::new(config.card_path()?))
}

/// Opens Cursor's state database named by the config.
pub fn credential_store(config: &Config) -> Result<CredentialStateStore> {
    Ok(CredentialStateStore::new(config.state_db_path()?))
}

/// Builds the HTTP client for the provisioning service.
pub fn service_http(config: &Config) -> Result<ServiceHttp> {
    Ok(ServiceHttp::new(config.api_base(), config.request_timeout())?)
}
