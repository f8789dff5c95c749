//! Provisioned accounts.
//!
//! An [`Account`] is whatever the provisioning service handed out on one
//! request. Only accounts that pass [`Account::into_usable`] are committed.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pull count at which an account is considered used up.
///
/// Fixed by the provisioning protocol, not configurable per call.
pub const MAX_PULL_COUNT: u64 = 5;

// ============================================================================
// Account Status
// ============================================================================

/// Pool status reported for an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Account is available.
    Active,
    /// Account went over its usage quota.
    Exceeded,
    /// Account has no usage left.
    Depleted,
    /// Missing or unrecognized status.
    #[default]
    #[serde(other)]
    Unknown,
}

impl AccountStatus {
    /// Returns true if accounts with this status must be skipped.
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Exceeded | Self::Depleted)
    }

    /// Returns the wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Exceeded => "EXCEEDED",
            Self::Depleted => "DEPLETED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Account Usage
// ============================================================================

/// Usage counters reported alongside an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUsage {
    /// Requests used so far.
    #[serde(default)]
    pub current: u64,
    /// Total requests allowed.
    #[serde(default)]
    pub total: u64,
}

impl fmt::Display for AccountUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.total)
    }
}

// ============================================================================
// Account
// ============================================================================

/// An account returned by the provisioning service.
///
/// `access_token` is not part of the wire response: it is filled in by
/// token resolution, either from a usable `refresh_token` or from the
/// fallback refresh endpoint.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Account {
    /// Remote account ID.
    pub id: Option<String>,
    /// Account email.
    pub email: Option<String>,
    /// Account password, only used for the refresh token fallback.
    pub password: Option<String>,
    /// Refresh token as issued (or as fetched by the fallback).
    pub refresh_token: Option<String>,
    /// Resolved access credential.
    pub access_token: Option<String>,
    /// Pool status.
    pub status: AccountStatus,
    /// How many times this account has been handed out.
    pub pull_count: u64,
    /// Usage counters, when reported.
    pub usage: Option<AccountUsage>,
}

impl Account {
    /// Returns the exclusion reason if this account must be skipped.
    ///
    /// The pull count quota applies regardless of status.
    pub fn exclusion(&self) -> Option<AccountRejection> {
        if self.status.is_exhausted() || self.pull_count >= MAX_PULL_COUNT {
            Some(AccountRejection::Excluded {
                status: self.status,
                pull_count: self.pull_count,
            })
        } else {
            None
        }
    }

    /// Returns the first required field that is missing or empty.
    pub fn missing_field(&self) -> Option<&'static str> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());

        if !present(&self.email) {
            Some("email")
        } else if !present(&self.access_token) {
            Some("access_token")
        } else if !present(&self.refresh_token) {
            Some("refresh_token")
        } else {
            None
        }
    }

    /// Applies the exclusion rule, then the completeness rule.
    pub fn into_usable(self) -> Result<UsableAccount, AccountRejection> {
        if let Some(rejection) = self.exclusion() {
            return Err(rejection);
        }
        if let Some(missing) = self.missing_field() {
            return Err(AccountRejection::Incomplete { missing });
        }

        let (Some(email), Some(access_token), Some(refresh_token)) =
            (self.email, self.access_token, self.refresh_token)
        else {
            return Err(AccountRejection::Incomplete { missing: "email" });
        };

        Ok(UsableAccount {
            id: self.id,
            email,
            access_token,
            refresh_token,
            status: self.status,
            pull_count: self.pull_count,
            usage: self.usage,
        })
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("has_password", &self.password.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("has_access_token", &self.access_token.is_some())
            .field("status", &self.status)
            .field("pull_count", &self.pull_count)
            .field("usage", &self.usage)
            .finish()
    }
}

// ============================================================================
// Usable Account
// ============================================================================

/// An account that passed both the exclusion and completeness rules.
#[derive(Clone, PartialEq, Eq)]
pub struct UsableAccount {
    /// Remote account ID.
    pub id: Option<String>,
    /// Account email.
    pub email: String,
    /// Resolved access credential.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// Pool status.
    pub status: AccountStatus,
    /// Pull count at the time of the request.
    pub pull_count: u64,
    /// Usage counters, when reported.
    pub usage: Option<AccountUsage>,
}

impl fmt::Debug for UsableAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsableAccount")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("status", &self.status)
            .field("pull_count", &self.pull_count)
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Rejection
// ============================================================================

/// Why a fetched account was not committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountRejection {
    /// Account is exhausted or over the pull quota.
    #[error("account excluded: status={status}, pull_count={pull_count}")]
    Excluded {
        /// Reported status.
        status: AccountStatus,
        /// Reported pull count.
        pull_count: u64,
    },

    /// A required field is missing after token resolution.
    #[error("account incomplete: missing {missing}")]
    Incomplete {
        /// Name of the first missing field.
        missing: &'static str,
    },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(status: AccountStatus, pull_count: u64) -> Account {
        Account {
            id: Some("42".to_string()),
            email: Some("a@b.com".to_string()),
            password: Some("pw".to_string()),
            refresh_token: Some("ey.xyz".to_string()),
            access_token: Some("ey.xyz".to_string()),
            status,
            pull_count,
            usage: None,
        }
    }

    #[test]
    fn test_active_account_is_usable() {
        let usable = complete(AccountStatus::Active, 0).into_usable().unwrap();
        assert_eq!(usable.email, "a@b.com");
        assert_eq!(usable.access_token, "ey.xyz");
    }

    #[test]
    fn test_exhausted_statuses_are_excluded() {
        for status in [AccountStatus::Exceeded, AccountStatus::Depleted] {
            let rejection = complete(status, 0).into_usable().unwrap_err();
            assert_eq!(
                rejection,
                AccountRejection::Excluded {
                    status,
                    pull_count: 0
                }
            );
        }
    }

    #[test]
    fn test_pull_count_quota_dominates_status() {
        let rejection = complete(AccountStatus::Active, 5).into_usable().unwrap_err();
        assert!(matches!(rejection, AccountRejection::Excluded { pull_count: 5, .. }));

        assert!(complete(AccountStatus::Active, 4).into_usable().is_ok());
    }

    #[test]
    fn test_unknown_status_is_not_excluded() {
        assert!(complete(AccountStatus::Unknown, 0).into_usable().is_ok());
    }

    #[test]
    fn test_missing_fields_are_incomplete() {
        let mut account = complete(AccountStatus::Active, 0);
        account.email = None;
        assert_eq!(
            account.into_usable().unwrap_err(),
            AccountRejection::Incomplete { missing: "email" }
        );

        let mut account = complete(AccountStatus::Active, 0);
        account.access_token = Some(String::new());
        assert_eq!(
            account.into_usable().unwrap_err(),
            AccountRejection::Incomplete {
                missing: "access_token"
            }
        );

        let mut account = complete(AccountStatus::Active, 0);
        account.refresh_token = None;
        assert_eq!(
            account.into_usable().unwrap_err(),
            AccountRejection::Incomplete {
                missing: "refresh_token"
            }
        );
    }

    #[test]
    fn test_exclusion_checked_before_completeness() {
        let account = Account {
            status: AccountStatus::Depleted,
            ..Account::default()
        };
        assert!(matches!(
            account.into_usable(),
            Err(AccountRejection::Excluded { .. })
        ));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", complete(AccountStatus::Active, 0));
        assert!(!debug.contains("ey.xyz"));
        assert!(!debug.contains("\"pw\""));
    }
}
