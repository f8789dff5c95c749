// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # cursorauth Fetch
//!
//! HTTP clients for the provisioning service.
//!
//! - [`client::ServiceHttp`] - Shared reqwest client bound to the service base URL
//! - [`provisioning::ProvisioningClient`] - Bearer token to account exchange,
//!   with the refresh token fallback
//! - [`activation::ActivationClient`] - Card check and activation
//! - [`source::AccountSource`] - Trait seam the sync orchestrator drives
//!
//! ## Example
//!
//! ```ignore
//! use cursorauth_core::{BearerToken, ClientMeta};
//! use cursorauth_fetch::{ProvisioningClient, ServiceHttp};
//!
//! let http = ServiceHttp::new("https://host/api", Duration::from_secs(30))?;
//! let client = ProvisioningClient::new(http);
//!
//! let token = BearerToken::new("tok-1")?;
//! let account = client.fetch_account(&token, &ClientMeta::current("1.0.0")).await?;
//! ```

pub mod activation;
pub mod client;
pub mod error;
pub mod provisioning;
pub mod source;

pub use activation::{Activation, ActivationClient, CardStatus};
pub use client::ServiceHttp;
pub use error::FetchError;
pub use provisioning::ProvisioningClient;
pub use source::AccountSource;
