// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `cursorauth` Core
//!
//! Core types and account rules for the `cursorauth` credential sync engine.
//!
//! This crate has no I/O. It provides:
//!
//! - Domain models (bearer token, provisioned account, card number)
//! - The token validity check and the account exclusion rules
//! - The fixed credential field set written into Cursor's state store
//!
//! ## Key Types
//!
//! - [`BearerToken`] - Opaque credential identifying the local client
//! - [`Account`] - An account handed out by the provisioning service
//! - [`UsableAccount`] - An account that passed exclusion and completeness checks
//! - [`CredentialSet`] - Ordered `field -> value` pairs to commit
//! - [`ClientMeta`] - Client metadata sent with every provisioning request

pub mod error;
pub mod models;

pub use error::CoreError;

pub use models::{
    // Accounts
    Account,
    AccountRejection,
    AccountStatus,
    AccountUsage,
    UsableAccount,
    MAX_PULL_COUNT,
    // Tokens
    BearerToken,
    is_usable_token,
    // Cards
    CardNumber,
    CARD_NUMBER_LEN,
    // Credentials
    AUTH_NAMESPACE,
    CredentialSet,
    EMAIL_ALIASES,
    TOKEN_ALIASES,
    auth_key,
    // Client
    ClientMeta,
    DEFAULT_CLIENT_VERSION,
};
