//! Bearer tokens and refresh token validity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Literal prefix of a base64url-encoded JWT header.
const JWT_PREFIX: &str = "ey";

/// Returns true if `token` is usable as a Cursor access credential.
///
/// Only the `"ey"` prefix is checked. Nothing about the JWT structure or
/// signature is verified.
pub fn is_usable_token(token: &str) -> bool {
    token.starts_with(JWT_PREFIX)
}

// ============================================================================
// Bearer Token
// ============================================================================

/// Opaque credential identifying this client to the provisioning service.
///
/// Seeded by card activation and persisted by the token store. The only
/// local validation is that it is non-empty.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    /// Creates a token, rejecting empty or whitespace-only input.
    pub fn new(token: impl Into<String>) -> Result<Self, CoreError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(CoreError::EmptyToken);
        }
        if trimmed.len() == token.len() {
            Ok(Self(token))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Returns the raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns a masked form safe for display.
    pub fn masked(&self) -> String {
        let visible: String = self.0.chars().take(4).collect();
        format!("{visible}******")
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&"******").finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
