//! Sync error types.

use cursorauth_fetch::FetchError;
use cursorauth_store::StoreError;
use thiserror::Error;

/// Terminal failure of a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No bearer token is stored.
    #[error("No bearer token stored; activate a card first")]
    NoToken,

    /// The token file could not be read.
    #[error("Token file error: {0}")]
    File(#[source] StoreError),

    /// The final attempt failed at the request level.
    #[error("Provisioning unreachable after {attempts} attempts: {last}")]
    NetworkExhausted {
        /// Attempts made.
        attempts: u32,
        /// Error of the final attempt.
        #[source]
        last: FetchError,
    },

    /// The provisioning client cannot make requests at all.
    #[error("Provisioning client error: {0}")]
    Client(#[source] FetchError),

    /// Every attempt produced an excluded or incomplete account.
    #[error("No usable account after {attempts} attempts")]
    NoUsableAccount {
        /// Attempts made.
        attempts: u32,
    },

    /// Writing the credentials failed. Earlier writes may persist.
    #[error("Failed to commit credentials: {0}")]
    Commit(#[source] StoreError),
}

impl SyncError {
    /// Stable reason code for scripts and JSON output.
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::NoToken => "no_token",
            Self::File(_) => "file_error",
            Self::NetworkExhausted { .. } => "network_exhausted",
            Self::Client(_) => "client_error",
            Self::NoUsableAccount { .. } => "no_usable_account",
            Self::Commit(_) => "store_error",
        }
    }
}
