// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # cursorauth Store
//!
//! Local persistence for the cursorauth sync engine.
//!
//! This crate provides:
//!
//! - **TokenStore**: the single bearer token file in the user's home
//! - **CardStore**: the last activated card, next to the token
//! - **CredentialStateStore**: the `cursorAuth/` namespace inside Cursor's
//!   `state.vscdb` SQLite table
//! - **Config**: JSON configuration with environment overrides
//! - **Paths**: default locations for all of the above
//!
//! ## Usage
//!
//! ```ignore
//! use cursorauth_store::{Config, CredentialStateStore, TokenStore};
//!
//! let config = Config::load()?;
//! let tokens = TokenStore::new(config.token_path()?);
//! let credentials = CredentialStateStore::new(config.state_db_path()?);
//!
//! let info = credentials.auth_info()?;
//! println!("Logged in as {}", info.email);
//! ```

pub mod config;
pub mod error;
pub mod paths;
pub mod state_db;
pub mod token_store;

pub use config::Config;
pub use error::StoreError;
pub use paths::{
    cursor_config_dir, cursor_state_db_path, default_config_dir, default_config_path,
    default_token_path,
};
pub use state_db::{AuthInfo, CommitMode, CredentialStateStore, UNKNOWN_EMAIL};
pub use token_store::{CARD_FILE_NAME, CardStore, TokenStore};
#[cfg(test)]
mod state_db_tests;
