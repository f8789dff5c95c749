//! JSON output formatting.

use anyhow::Result;
use cursorauth_sync::{SyncAttempt, SyncOutcome, SyncedAccount};
use serde::Serialize;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for a sync run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutput<'a> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<&'a SyncedAccount>,
    pub attempts: &'a [SyncAttempt],
    pub duration_ms: u64,
}

impl<'a> SyncOutput<'a> {
    /// Borrows the reportable parts of an outcome.
    pub fn from_outcome(outcome: &'a SyncOutcome) -> Self {
        Self {
            success: outcome.is_success(),
            reason: outcome.reason_code(),
            error: outcome.result.as_ref().err().map(ToString::to_string),
            account: outcome.result.as_ref().ok(),
            attempts: &outcome.attempts,
            duration_ms: u64::try_from(outcome.duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Current session as shown by `status`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusOutput {
    pub logged_in: bool,
    pub email: String,
    pub has_access_token: bool,
    pub has_refresh_token: bool,
    /// Masked bearer token, if one is stored.
    pub bearer_token: Option<String>,
    pub fields: Vec<String>,
    pub state_db: String,
}

/// Resolved file locations.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsOutput {
    pub config_file: String,
    pub token_file: String,
    pub card_file: String,
    pub state_db: String,
    pub api_base_url: String,
}

/// Result of a card activation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationOutput {
    pub card: String,
    pub reissued: bool,
    pub refreshed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u64>,
    pub token_saved: bool,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }
}
