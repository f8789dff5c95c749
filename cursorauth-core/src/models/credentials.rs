//! The `cursorAuth/` namespace and the credential fields committed into it.
//!
//! Cursor reads different key names in different code paths, so the same
//! email and token values are written under several aliases. All of them
//! must agree after a commit.

use super::account::UsableAccount;
use super::token::is_usable_token;

/// Key prefix owned by this engine inside Cursor's state table.
pub const AUTH_NAMESPACE: &str = "cursorAuth/";

/// Fields that all receive the resolved access token.
pub const TOKEN_ALIASES: [&str; 5] = [
    "cachedAccessToken",
    "accessToken",
    "token",
    "refreshToken",
    "cachedRefreshToken",
];

/// Fields that both receive the account email.
pub const EMAIL_ALIASES: [&str; 2] = ["cachedEmail", "email"];

/// Sign-up type marker Cursor expects for a logged-in session.
const SIGN_UP_TYPE: &str = "Auth_0";

/// Membership tier written on every commit.
const MEMBERSHIP_TYPE: &str = "free_trial";

/// Returns the full store key for a field.
pub fn auth_key(field: &str) -> String {
    if field.starts_with(AUTH_NAMESPACE) {
        field.to_string()
    } else {
        format!("{AUTH_NAMESPACE}{field}")
    }
}

// ============================================================================
// Credential Set
// ============================================================================

/// Ordered `field -> value` pairs to upsert under [`AUTH_NAMESPACE`].
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialSet {
    entries: Vec<(&'static str, String)>,
}

impl CredentialSet {
    /// Builds the logged-in field set.
    ///
    /// The sign-up markers, the `isLoggedIn` flag and the membership tier are
    /// always present. Email aliases are added when an email is given, and
    /// token aliases only when the token passes [`is_usable_token`].
    pub fn logged_in(email: Option<&str>, token: Option<&str>) -> Self {
        let mut entries = vec![
            ("cachedSignUpType", SIGN_UP_TYPE.to_string()),
            ("signUpType", SIGN_UP_TYPE.to_string()),
            ("isLoggedIn", "true".to_string()),
            ("stripeMembershipType", MEMBERSHIP_TYPE.to_string()),
        ];

        if let Some(email) = email {
            entries.extend(EMAIL_ALIASES.iter().map(|field| (*field, email.to_string())));
        }

        if let Some(token) = token.filter(|t| is_usable_token(t)) {
            entries.extend(TOKEN_ALIASES.iter().map(|field| (*field, token.to_string())));
        }

        Self { entries }
    }

    /// Builds the field set for a usable account.
    pub fn for_account(account: &UsableAccount) -> Self {
        Self::logged_in(Some(&account.email), Some(&account.access_token))
    }

    /// Returns `(full key, value)` pairs in write order.
    pub fn keyed(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.entries
            .iter()
            .map(|(field, value)| (auth_key(field), value.as_str()))
    }

    /// Returns the value for a field, if present.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for CredentialSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields: Vec<&str> = self.entries.iter().map(|(field, _)| *field).collect();
        f.debug_struct("CredentialSet").field("fields", &fields).finish()
    }
}
