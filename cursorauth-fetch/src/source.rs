//! Account source abstraction.

use async_trait::async_trait;
use cursorauth_core::{Account, BearerToken, ClientMeta};

use crate::error::FetchError;

/// Anything that can hand out one account per call.
///
/// Implemented by [`crate::ProvisioningClient`].
#[async_trait]
pub trait AccountSource: Send + Sync {
    /// Requests one account for `token`.
    ///
    /// The returned account has its access credential resolved but has not
    /// been checked for exclusion or completeness.
    async fn fetch_account(
        &self,
        token: &BearerToken,
        meta: &ClientMeta,
    ) -> Result<Account, FetchError>;
}
