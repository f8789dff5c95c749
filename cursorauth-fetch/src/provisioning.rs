//! Provisioning client: bearer token to account exchange.
//!
//! ## Protocol
//!
//! 1. `POST /auth/get-cursor-token` with [`ClientMeta`] and the bearer token.
//! 2. If the issued `refresh_token` starts with `ey` it becomes the access
//!    credential. Otherwise `POST /auth/get-refresh-token` with the account's
//!    email and password; if that token is not usable either the attempt
//!    fails with [`FetchError::TokenUnresolved`].
//!
//! Exclusion and completeness are not checked here; see
//! [`cursorauth_core::Account::into_usable`].

use async_trait::async_trait;
use cursorauth_core::{Account, AccountStatus, AccountUsage, BearerToken, ClientMeta, is_usable_token};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use crate::client::{ServiceHttp, read_json};
use crate::error::FetchError;
use crate::source::AccountSource;

// ============================================================================
// Constants
// ============================================================================

/// Account provisioning endpoint.
pub const CURSOR_TOKEN_ENDPOINT: &str = "/auth/get-cursor-token";

/// Refresh token fallback endpoint.
pub const REFRESH_TOKEN_ENDPOINT: &str = "/auth/get-refresh-token";

/// Body fields that carry a business-level error message.
const REJECTION_FIELDS: &[&str] = &["detail", "error", "message"];

// ============================================================================
// Wire Types
// ============================================================================

/// Account as returned by the provisioning endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
struct AccountPayload {
    #[serde(default)]
    id: Option<Value>,

    #[serde(default)]
    email: Option<String>,

    #[serde(default)]
    password: Option<String>,

    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,

    #[serde(default)]
    status: Option<AccountStatus>,

    #[serde(default, alias = "pullCount")]
    pull_count: Option<u64>,

    #[serde(default)]
    usage: Option<AccountUsage>,
}

impl AccountPayload {
    fn into_account(self) -> Account {
        let id = match self.id {
            Some(Value::String(s)) => Some(s),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };

        Account {
            id,
            email: self.email,
            password: self.password,
            refresh_token: self.refresh_token,
            access_token: None,
            status: self.status.unwrap_or_default(),
            pull_count: self.pull_count.unwrap_or(0),
            usage: self.usage,
        }
    }
}

/// Body of the refresh token fallback request.
#[derive(Serialize)]
struct RefreshRequest<'a> {
    email: Option<&'a str>,
    password: Option<&'a str>,
}

/// Response of the refresh token fallback.
#[derive(Debug, Deserialize)]
struct RefreshPayload {
    #[serde(default, alias = "refreshToken")]
    refresh_token: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Stateless client for the provisioning endpoints.
#[derive(Debug, Clone)]
pub struct ProvisioningClient {
    http: ServiceHttp,
}

impl ProvisioningClient {
    /// Creates a client on top of a shared [`ServiceHttp`].
    pub fn new(http: ServiceHttp) -> Self {
        Self { http }
    }

    /// Requests one account and resolves its access credential.
    #[instrument(skip(self, token, meta), fields(system = %meta.system))]
    pub async fn fetch_account(
        &self,
        token: &BearerToken,
        meta: &ClientMeta,
    ) -> Result<Account, FetchError> {
        debug!(endpoint = CURSOR_TOKEN_ENDPOINT, "Requesting account");

        let response = self
            .http
            .post(CURSOR_TOKEN_ENDPOINT)
            .bearer_auth(token.as_str())
            .json(meta)
            .send()
            .await?;

        let body = read_json(response, CURSOR_TOKEN_ENDPOINT).await?;
        let mut account = parse_account(body)?;

        info!(
            id = account.id.as_deref().unwrap_or("-"),
            email = account.email.as_deref().unwrap_or("-"),
            status = %account.status,
            pull_count = account.pull_count,
            usage = %account.usage.map(|u| u.to_string()).unwrap_or_else(|| "-".to_string()),
            "Account received"
        );

        match account.refresh_token.as_deref() {
            Some(issued) if is_usable_token(issued) => {
                account.access_token = Some(issued.to_string());
            }
            _ => {
                debug!("Issued refresh token unusable, trying fallback");
                let refreshed = self
                    .fetch_refresh_token(token, account.email.as_deref(), account.password.as_deref())
                    .await
                    .map_err(|e| match e {
                        FetchError::TokenUnresolved(_) => e,
                        other => FetchError::TokenUnresolved(other.to_string()),
                    })?;
                account.access_token = Some(refreshed.clone());
                account.refresh_token = Some(refreshed);
            }
        }

        Ok(account)
    }

    /// Fetches a refresh token for an account's email and password.
    ///
    /// Fails with [`FetchError::TokenUnresolved`] if the returned token is
    /// missing or does not pass the validity check.
    #[instrument(skip(self, token, password))]
    pub async fn fetch_refresh_token(
        &self,
        token: &BearerToken,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<String, FetchError> {
        let response = self
            .http
            .post(REFRESH_TOKEN_ENDPOINT)
            .bearer_auth(token.as_str())
            .json(&RefreshRequest { email, password })
            .send()
            .await?;

        let body = read_json(response, REFRESH_TOKEN_ENDPOINT).await?;
        let payload: RefreshPayload = serde_json::from_value(body).map_err(|e| {
            FetchError::MalformedResponse(format!("{REFRESH_TOKEN_ENDPOINT}: {e}"))
        })?;

        match payload.refresh_token {
            Some(refresh) if is_usable_token(&refresh) => Ok(refresh),
            Some(_) => {
                warn!("Fallback refresh token has the wrong format");
                Err(FetchError::TokenUnresolved(
                    "fallback refresh token has the wrong format".to_string(),
                ))
            }
            None => Err(FetchError::TokenUnresolved(
                "fallback returned no refresh token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl AccountSource for ProvisioningClient {
    async fn fetch_account(
        &self,
        token: &BearerToken,
        meta: &ClientMeta,
    ) -> Result<Account, FetchError> {
        ProvisioningClient::fetch_account(self, token, meta).await
    }
}

/// Validates the body shape and converts it to an [`Account`].
fn parse_account(body: Value) -> Result<Account, FetchError> {
    let Value::Object(map) = body else {
        return Err(FetchError::MalformedResponse(format!(
            "{CURSOR_TOKEN_ENDPOINT}: expected a JSON object"
        )));
    };

    if let Some(message) = rejection_message(&map) {
        return Err(FetchError::ServerRejection(message));
    }

    let payload: AccountPayload = serde_json::from_value(Value::Object(map))
        .map_err(|e| FetchError::MalformedResponse(format!("{CURSOR_TOKEN_ENDPOINT}: {e}")))?;

    Ok(payload.into_account())
}

/// Returns the error message of a body that carries no account at all.
fn rejection_message(map: &Map<String, Value>) -> Option<String> {
    let has_account = ["email", "refresh_token", "refreshToken"]
        .iter()
        .any(|k| map.get(*k).is_some_and(|v| !v.is_null()));
    if has_account {
        return None;
    }

    REJECTION_FIELDS
        .iter()
        .find_map(|k| map.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;

    fn client(server: &MockServer) -> ProvisioningClient {
        let http = ServiceHttp::new(&server.base_url(), Duration::from_secs(5)).unwrap();
        ProvisioningClient::new(http)
    }

    fn token() -> BearerToken {
        BearerToken::new("tok-1").unwrap()
    }

    fn meta() -> ClientMeta {
        ClientMeta {
            client_version: "1.0.0".to_string(),
            system: "linux".to_string(),
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_parse_account_defaults() {
        let account = parse_account(json!({"email": "a@b.com", "refresh_token": "ey.1"})).unwrap();
        assert_eq!(account.status, AccountStatus::Unknown);
        assert_eq!(account.pull_count, 0);
        assert_eq!(account.usage, None);
        assert_eq!(account.access_token, None);
    }

    #[test]
    fn test_parse_account_numeric_id_and_usage() {
        let account = parse_account(json!({
            "id": 17,
            "email": "a@b.com",
            "status": "EXCEEDED",
            "pull_count": 3,
            "usage": {"current": 50, "total": 150}
        }))
        .unwrap();
        assert_eq!(account.id.as_deref(), Some("17"));
        assert_eq!(account.status, AccountStatus::Exceeded);
        assert_eq!(account.pull_count, 3);
        assert_eq!(account.usage, Some(AccountUsage { current: 50, total: 150 }));
    }

    #[test]
    fn test_parse_account_rejects_non_object() {
        assert!(matches!(
            parse_account(json!(["a@b.com"])),
            Err(FetchError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_account(json!("ok")),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_account_rejects_wrong_types() {
        assert!(matches!(
            parse_account(json!({"email": "a@b.com", "pull_count": "many"})),
            Err(FetchError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_parse_account_detects_rejection() {
        let err = parse_account(json!({"detail": "No accounts available"})).unwrap_err();
        assert!(matches!(err, FetchError::ServerRejection(m) if m == "No accounts available"));
    }

    #[tokio::test]
    async fn test_fetch_account_with_usable_refresh_token() {
        let server = MockServer::start();
        let account_mock = server.mock(|when, then| {
            when.method(POST)
                .path(CURSOR_TOKEN_ENDPOINT)
                .header("authorization", "Bearer tok-1")
                .body_includes("\"client_version\":\"1.0.0\"")
                .body_includes("\"system\":\"linux\"");
            then.status(200).json_body(json!({
                "id": "acc-1",
                "email": "a@b.com",
                "password": "pw",
                "refresh_token": "ey.xyz",
                "status": "ACTIVE",
                "pull_count": 1
            }));
        });
        let refresh_mock = server.mock(|when, then| {
            when.method(POST).path(REFRESH_TOKEN_ENDPOINT);
            then.status(200).json_body(json!({"refresh_token": "ey.other"}));
        });

        let account = client(&server).fetch_account(&token(), &meta()).await.unwrap();

        account_mock.assert();
        refresh_mock.assert_calls(0);
        assert_eq!(account.access_token.as_deref(), Some("ey.xyz"));
        assert_eq!(account.refresh_token.as_deref(), Some("ey.xyz"));
        assert_eq!(account.status, AccountStatus::Active);
    }

    #[tokio::test]
    async fn test_fetch_account_uses_refresh_fallback() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(CURSOR_TOKEN_ENDPOINT);
            then.status(200).json_body(json!({
                "email": "a@b.com",
                "password": "pw",
                "refresh_token": "opaque",
                "status": "ACTIVE"
            }));
        });
        let refresh_mock = server.mock(|when, then| {
            when.method(POST)
                .path(REFRESH_TOKEN_ENDPOINT)
                .header("authorization", "Bearer tok-1")
                .body_includes("\"email\":\"a@b.com\"")
                .body_includes("\"password\":\"pw\"");
            then.status(200).json_body(json!({"refresh_token": "ey.fresh"}));
        });

        let account = client(&server).fetch_account(&token(), &meta()).await.unwrap();

        refresh_mock.assert();
        assert_eq!(account.access_token.as_deref(), Some("ey.fresh"));
        assert_eq!(account.refresh_token.as_deref(), Some("ey.fresh"));
    }

    #[tokio::test]
    async fn test_fetch_account_fallback_unusable_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(CURSOR_TOKEN_ENDPOINT);
            then.status(200).json_body(json!({"email": "a@b.com", "password": "pw"}));
        });
        server.mock(|when, then| {
            when.method(POST).path(REFRESH_TOKEN_ENDPOINT);
            then.status(200).json_body(json!({"refresh_token": "nope"}));
        });

        let err = client(&server).fetch_account(&token(), &meta()).await.unwrap_err();
        assert!(matches!(err, FetchError::TokenUnresolved(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_account_fallback_http_failure_is_soft() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(CURSOR_TOKEN_ENDPOINT);
            then.status(200).json_body(json!({"email": "a@b.com"}));
        });
        server.mock(|when, then| {
            when.method(POST).path(REFRESH_TOKEN_ENDPOINT);
            then.status(500);
        });

        let err = client(&server).fetch_account(&token(), &meta()).await.unwrap_err();
        assert!(matches!(err, FetchError::TokenUnresolved(_)));
    }

    #[tokio::test]
    async fn test_fetch_account_http_error_is_network() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(CURSOR_TOKEN_ENDPOINT);
            then.status(401).json_body(json!({"detail": "Card expired"}));
        });

        let err = client(&server).fetch_account(&token(), &meta()).await.unwrap_err();
        assert!(err.is_network());
        match err {
            FetchError::Status { status, detail, .. } => {
                assert_eq!(status, 401);
                assert_eq!(detail, "Card expired");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_account_non_json_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path(CURSOR_TOKEN_ENDPOINT);
            then.status(200).body("<html>maintenance</html>");
        });

        let err = client(&server).fetch_account(&token(), &meta()).await.unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_account_unreachable_server() {
        let http = ServiceHttp::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let err = ProvisioningClient::new(http)
            .fetch_account(&token(), &meta())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
        assert!(err.is_network());
    }
}
