//! Per-attempt records and the result of a sync run.

use std::fmt;
use std::time::Duration;

use cursorauth_core::{AccountRejection, AccountStatus, AccountUsage, UsableAccount};
use serde::Serialize;

use crate::error::SyncError;

// ============================================================================
// Synced Account
// ============================================================================

/// The account committed by a successful run. Carries no secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncedAccount {
    /// Remote account ID.
    pub account_id: Option<String>,
    /// Account email.
    pub email: String,
    /// Pool status at request time.
    pub status: AccountStatus,
    /// Pull count at request time.
    pub pull_count: u64,
    /// Usage counters, when reported.
    pub usage: Option<AccountUsage>,
    /// Number of store keys written.
    pub keys_written: usize,
}

impl SyncedAccount {
    /// Summarizes a committed account.
    pub fn new(account: &UsableAccount, keys_written: usize) -> Self {
        Self {
            account_id: account.id.clone(),
            email: account.email.clone(),
            status: account.status,
            pull_count: account.pull_count,
            usage: account.usage,
            keys_written,
        }
    }
}

// ============================================================================
// Sync Attempt
// ============================================================================

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Account written to the store.
    Committed,
    /// Account rejected by status or pull quota.
    Excluded(String),
    /// Account missing a required field.
    Incomplete(String),
    /// Request or commit failed.
    Failed(String),
}

impl AttemptOutcome {
    /// Maps an account rejection to its outcome.
    pub fn rejected(rejection: &AccountRejection) -> Self {
        match rejection {
            AccountRejection::Excluded { .. } => Self::Excluded(rejection.to_string()),
            AccountRejection::Incomplete { .. } => Self::Incomplete(rejection.to_string()),
        }
    }

    /// Short label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Excluded(_) => "excluded",
            Self::Incomplete(_) => "incomplete",
            Self::Failed(_) => "failed",
        }
    }

    /// Reason text for non-committed outcomes.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Committed => None,
            Self::Excluded(r) | Self::Incomplete(r) | Self::Failed(r) => Some(r),
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason() {
            Some(reason) => write!(f, "{}: {reason}", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// Record of one provisioning attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SyncAttempt {
    /// Attempt number, from 1.
    pub attempt: u32,
    /// Account ID, when an account was received.
    pub account_id: Option<String>,
    /// Account email, when an account was received.
    pub email: Option<String>,
    /// How the attempt ended.
    pub outcome: AttemptOutcome,
    /// Time spent on the attempt.
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn as_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
}

// ============================================================================
// Sync Outcome
// ============================================================================

/// Result of a sync run with its attempt history.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Committed account or terminal error.
    pub result: Result<SyncedAccount, SyncError>,
    /// Attempts made, in order.
    pub attempts: Vec<SyncAttempt>,
    /// Total run time.
    pub duration: Duration,
}

impl SyncOutcome {
    /// Returns true if credentials were committed.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Number of provisioning attempts made.
    pub fn attempts_count(&self) -> usize {
        self.attempts.len()
    }

    /// Reason code of the failure, if any.
    pub fn reason_code(&self) -> Option<&'static str> {
        self.result.as_ref().err().map(SyncError::reason_code)
    }

    /// Reasons of all attempts that did not commit.
    pub fn errors(&self) -> Vec<&str> {
        self.attempts
            .iter()
            .filter_map(|a| a.outcome.reason())
            .collect()
    }
}
