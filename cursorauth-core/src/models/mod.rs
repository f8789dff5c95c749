//! Domain models for `cursorauth`.
//!
//! ## Submodules
//!
//! - [`account`] - Provisioned accounts and the rules deciding if one is usable
//! - [`token`] - Bearer tokens and the refresh token validity check
//! - [`card`] - Activation card numbers
//! - [`credentials`] - The `cursorAuth/` namespace and the committed field set
//! - [`client`] - Client metadata sent to the provisioning service

pub mod account;
pub mod card;
pub mod client;
pub mod credentials;
pub mod token;

pub use account::{
    Account, AccountRejection, AccountStatus, AccountUsage, MAX_PULL_COUNT, UsableAccount,
};
pub use card::{CARD_NUMBER_LEN, CardNumber};
pub use client::{ClientMeta, DEFAULT_CLIENT_VERSION};
pub use credentials::{AUTH_NAMESPACE, CredentialSet, EMAIL_ALIASES, TOKEN_ALIASES, auth_key};
pub use token::{BearerToken, is_usable_token};
