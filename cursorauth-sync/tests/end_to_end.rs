//! Full sync against a mocked provisioning service and a real SQLite file.

use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use cursorauth_core::TOKEN_ALIASES;
use cursorauth_fetch::{ProvisioningClient, ServiceHttp};
use cursorauth_store::{CommitMode, CredentialStateStore, TokenStore};
use cursorauth_sync::{SyncOptions, SyncOrchestrator};

struct Env {
    _temp: TempDir,
    tokens: TokenStore,
    credentials: CredentialStateStore,
}

fn env() -> Env {
    let temp = TempDir::new().unwrap();
    let tokens = TokenStore::new(temp.path().join(".cursor_auth").join("token"));
    let credentials = CredentialStateStore::new(
        temp.path()
            .join("Cursor")
            .join("User")
            .join("globalStorage")
            .join("state.vscdb"),
    );
    Env {
        _temp: temp,
        tokens,
        credentials,
    }
}

fn orchestrator(
    server: &MockServer,
    env: &Env,
    mode: CommitMode,
) -> SyncOrchestrator<ProvisioningClient> {
    let http = ServiceHttp::new(&server.url("/api"), Duration::from_secs(5)).unwrap();
    SyncOrchestrator::new(
        ProvisioningClient::new(http),
        env.tokens.clone(),
        env.credentials.clone(),
        SyncOptions {
            client_version: "1.0.0".to_string(),
            commit_mode: mode,
        },
    )
}

#[tokio::test]
async fn test_sync_writes_logged_in_session() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/get-cursor-token")
            .header("authorization", "Bearer tok-1");
        then.status(200).json_body(json!({
            "email": "a@b.com",
            "refresh_token": "ey.xyz",
            "status": "ACTIVE",
            "pull_count": 0
        }));
    });

    let env = env();
    env.tokens.save("tok-1").unwrap();

    let outcome = orchestrator(&server, &env, CommitMode::Incremental).run().await;

    mock.assert();
    let synced = outcome.result.unwrap();
    assert_eq!(synced.email, "a@b.com");

    let fields = env.credentials.read_namespace("cursorAuth/").unwrap();
    assert_eq!(fields["isLoggedIn"], "true");
    assert_eq!(fields["cachedEmail"], "a@b.com");
    for alias in TOKEN_ALIASES {
        assert_eq!(fields[alias], "ey.xyz", "alias {alias}");
    }

    let info = env.credentials.auth_info().unwrap();
    assert_eq!(info.email, "a@b.com");
    assert!(info.is_logged_in());
}

#[tokio::test]
async fn test_sync_resolves_token_through_fallback() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/get-cursor-token");
        then.status(200).json_body(json!({
            "email": "a@b.com",
            "password": "pw",
            "refresh_token": "opaque",
            "status": "ACTIVE",
            "pull_count": 2
        }));
    });
    server.mock(|when, then| {
        when.method(POST).path("/api/auth/get-refresh-token");
        then.status(200).json_body(json!({"refresh_token": "ey.fallback"}));
    });

    let env = env();
    env.tokens.save("tok-1").unwrap();

    let outcome = orchestrator(&server, &env, CommitMode::Transactional).run().await;

    assert!(outcome.is_success());
    assert_eq!(
        env.credentials.get("accessToken").unwrap().as_deref(),
        Some("ey.fallback")
    );
}

#[tokio::test]
async fn test_sync_gives_up_after_three_server_errors() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/auth/get-cursor-token");
        then.status(502);
    });

    let env = env();
    env.tokens.save("tok-1").unwrap();

    let outcome = orchestrator(&server, &env, CommitMode::Incremental).run().await;

    assert_eq!(outcome.reason_code(), Some("network_exhausted"));
    mock.assert_calls(3);
}

#[tokio::test]
async fn test_sync_retries_non_json_bodies() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/auth/get-cursor-token");
        then.status(200)
            .header("content-type", "text/html")
            .body("<html>busy</html>");
    });

    let env = env();
    env.tokens.save("tok-1").unwrap();

    let outcome = orchestrator(&server, &env, CommitMode::Incremental).run().await;

    assert_eq!(outcome.reason_code(), Some("no_usable_account"));
    assert_eq!(outcome.attempts.len(), 3);
    mock.assert_calls(3);
}

#[tokio::test]
async fn test_sync_without_token_makes_no_requests() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/auth/get-cursor-token");
        then.status(200).json_body(json!({}));
    });

    let env = env();
    let outcome = orchestrator(&server, &env, CommitMode::Incremental).run().await;

    assert_eq!(outcome.reason_code(), Some("no_token"));
    mock.assert_calls(0);
}
