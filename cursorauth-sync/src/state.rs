//! States of the sync machine.

use std::fmt;

use cursorauth_core::{Account, BearerToken, UsableAccount};

use crate::error::SyncError;
use crate::outcome::SyncedAccount;

/// One state of a sync run. Attempts are numbered from 1.
#[derive(Debug)]
pub enum SyncState {
    /// Nothing done yet.
    Start,
    /// Token read; about to clear the namespace.
    Clearing {
        /// Bearer token for the run.
        token: BearerToken,
    },
    /// About to request an account.
    Requesting {
        /// Bearer token for the run.
        token: BearerToken,
        /// Current attempt.
        attempt: u32,
    },
    /// Account received; exclusion and completeness not yet checked.
    Validating {
        /// Bearer token for the run.
        token: BearerToken,
        /// Current attempt.
        attempt: u32,
        /// Account as received.
        account: Account,
    },
    /// Usable account; about to write it.
    Committing {
        /// Current attempt.
        attempt: u32,
        /// Account to commit.
        account: UsableAccount,
    },
    /// Credentials written.
    Success(SyncedAccount),
    /// Run failed.
    Failed(SyncError),
}

impl SyncState {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Clearing { .. } => "clearing",
            Self::Requesting { .. } => "requesting",
            Self::Validating { .. } => "validating",
            Self::Committing { .. } => "committing",
            Self::Success(_) => "success",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
