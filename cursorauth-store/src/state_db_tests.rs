//! Credential state store tests against real SQLite files.

use rusqlite::Connection;
use tempfile::TempDir;

use cursorauth_core::{AUTH_NAMESPACE, CredentialSet, TOKEN_ALIASES};

use crate::error::StoreError;
use crate::state_db::{CommitMode, CredentialStateStore, UNKNOWN_EMAIL};

fn temp_store() -> (TempDir, CredentialStateStore) {
    let temp = TempDir::new().unwrap();
    let store = CredentialStateStore::new(temp.path().join("globalStorage").join("state.vscdb"));
    (temp, store)
}

fn row_count(store: &CredentialStateStore, key: &str) -> i64 {
    let conn = Connection::open(store.path()).unwrap();
    conn.query_row("SELECT COUNT(*) FROM ItemTable WHERE key = ?1", [key], |row| {
        row.get(0)
    })
    .unwrap()
}

/// Makes any insert of `key` fail.
fn poison_key(store: &CredentialStateStore, key: &str) {
    let conn = Connection::open(store.path()).unwrap();
    conn.execute_batch(&format!(
        "CREATE TRIGGER poison BEFORE INSERT ON ItemTable WHEN NEW.key = '{key}' \
         BEGIN SELECT RAISE(ABORT, 'poisoned'); END;"
    ))
    .unwrap();
}

// ============================================================================
// Schema
// ============================================================================

#[test]
fn test_ensure_schema_creates_file_and_is_idempotent() {
    let (_temp, store) = temp_store();
    assert!(!store.path().exists());

    store.ensure_schema().unwrap();
    store.ensure_schema().unwrap();

    assert!(store.path().exists());
}

#[test]
fn test_works_with_cursor_schema() {
    let (_temp, store) = temp_store();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    {
        let conn = Connection::open(store.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE ItemTable (key TEXT UNIQUE ON CONFLICT REPLACE, value BLOB);
             INSERT INTO ItemTable VALUES ('cursorAuth/cachedEmail', CAST('old@b.com' AS BLOB));",
        )
        .unwrap();
    }

    assert_eq!(store.get("cachedEmail").unwrap().as_deref(), Some("old@b.com"));

    store.upsert("cachedEmail", "new@b.com").unwrap();
    assert_eq!(store.get("cachedEmail").unwrap().as_deref(), Some("new@b.com"));
    assert_eq!(row_count(&store, "cursorAuth/cachedEmail"), 1);
}

// ============================================================================
// Get / Put / Delete
// ============================================================================

#[test]
fn test_upsert_overwrites_without_duplicates() {
    let (_temp, store) = temp_store();

    store.upsert("accessToken", "v1").unwrap();
    store.upsert("accessToken", "v2").unwrap();

    assert_eq!(store.get("accessToken").unwrap().as_deref(), Some("v2"));
    assert_eq!(row_count(&store, "cursorAuth/accessToken"), 1);
}

#[test]
fn test_get_missing_field() {
    let (_temp, store) = temp_store();
    assert_eq!(store.get("email").unwrap(), None);
}

#[test]
fn test_delete() {
    let (_temp, store) = temp_store();
    store.upsert("email", "a@b.com").unwrap();

    assert!(store.delete("email").unwrap());
    assert!(!store.delete("email").unwrap());
    assert_eq!(store.get("email").unwrap(), None);
}

#[test]
fn test_fields_are_namespaced() {
    let (_temp, store) = temp_store();
    store.upsert("email", "a@b.com").unwrap();
    assert_eq!(row_count(&store, "cursorAuth/email"), 1);
    assert_eq!(row_count(&store, "email"), 0);
}

// ============================================================================
// Namespace
// ============================================================================

#[test]
fn test_clear_then_read_is_empty() {
    let (_temp, store) = temp_store();
    store.upsert("email", "a@b.com").unwrap();
    store.upsert("accessToken", "ey.1").unwrap();

    assert_eq!(store.clear_auth_namespace().unwrap(), 2);
    assert!(store.read_namespace(AUTH_NAMESPACE).unwrap().is_empty());
}

#[test]
fn test_clear_leaves_other_keys() {
    let (_temp, store) = temp_store();
    store.upsert("email", "a@b.com").unwrap();
    {
        let conn = Connection::open(store.path()).unwrap();
        conn.execute(
            "INSERT INTO ItemTable (key, value) VALUES ('workbench.theme', 'dark')",
            [],
        )
        .unwrap();
    }

    store.clear_auth_namespace().unwrap();
    assert_eq!(row_count(&store, "workbench.theme"), 1);
}

#[test]
fn test_clear_is_case_sensitive() {
    let (_temp, store) = temp_store();
    store.upsert("email", "a@b.com").unwrap();
    {
        let conn = Connection::open(store.path()).unwrap();
        conn.execute_batch(
            "INSERT INTO ItemTable (key, value) VALUES ('CURSORAUTH/foreign', 'x');
             INSERT INTO ItemTable (key, value) VALUES ('cursorauth/other', 'y');",
        )
        .unwrap();
    }

    assert_eq!(store.clear_auth_namespace().unwrap(), 1);
    assert_eq!(row_count(&store, "CURSORAUTH/foreign"), 1);
    assert_eq!(row_count(&store, "cursorauth/other"), 1);
    assert_eq!(row_count(&store, "cursorAuth/email"), 0);
}

#[test]
fn test_transactional_clear_is_case_sensitive() {
    let (_temp, store) = temp_store();
    store.ensure_schema().unwrap();
    {
        let conn = Connection::open(store.path()).unwrap();
        conn.execute(
            "INSERT INTO ItemTable (key, value) VALUES ('CursorAuth/foreign', 'x')",
            [],
        )
        .unwrap();
    }

    let set = CredentialSet::logged_in(Some("a@b.com"), Some("ey.xyz"));
    store.write_credentials(&set, CommitMode::Transactional).unwrap();

    assert_eq!(row_count(&store, "CursorAuth/foreign"), 1);
}

#[test]
fn test_read_namespace_strips_prefix() {
    let (_temp, store) = temp_store();
    store.upsert("cachedEmail", "a@b.com").unwrap();
    store.upsert("isLoggedIn", "true").unwrap();

    let fields = store.read_namespace(AUTH_NAMESPACE).unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields.get("cachedEmail").map(String::as_str), Some("a@b.com"));
    assert_eq!(fields.get("isLoggedIn").map(String::as_str), Some("true"));
}

#[test]
fn test_read_namespace_prefix_is_literal() {
    let (_temp, store) = temp_store();
    store.ensure_schema().unwrap();
    {
        let conn = Connection::open(store.path()).unwrap();
        conn.execute(
            "INSERT INTO ItemTable (key, value) VALUES ('cursorAuthXemail', 'x')",
            [],
        )
        .unwrap();
    }
    assert!(store.read_namespace(AUTH_NAMESPACE).unwrap().is_empty());
}

#[test]
fn test_auth_info_defaults() {
    let (_temp, store) = temp_store();
    let info = store.auth_info().unwrap();

    assert_eq!(info.email, UNKNOWN_EMAIL);
    assert_eq!(info.access_token, None);
    assert_eq!(info.refresh_token, None);
    assert!(!info.is_logged_in());
}

// ============================================================================
// Commit
// ============================================================================

#[test]
fn test_incremental_commit_writes_full_set() {
    let (_temp, store) = temp_store();
    let set = CredentialSet::logged_in(Some("a@b.com"), Some("ey.xyz"));

    assert_eq!(store.write_credentials(&set, CommitMode::Incremental).unwrap(), 11);

    let info = store.auth_info().unwrap();
    assert!(info.is_logged_in());
    assert_eq!(info.email, "a@b.com");
    assert_eq!(info.fields.get("cachedEmail").map(String::as_str), Some("a@b.com"));
    for alias in TOKEN_ALIASES {
        assert_eq!(info.fields.get(alias).map(String::as_str), Some("ey.xyz"), "{alias}");
    }
}

#[test]
fn test_incremental_commit_keeps_stale_fields() {
    let (_temp, store) = temp_store();
    store.upsert("cachedUser", "{}").unwrap();

    let set = CredentialSet::logged_in(Some("a@b.com"), Some("ey.xyz"));
    store.write_credentials(&set, CommitMode::Incremental).unwrap();

    assert!(store.get("cachedUser").unwrap().is_some());
}

#[test]
fn test_transactional_commit_replaces_namespace() {
    let (_temp, store) = temp_store();
    store.upsert("cachedUser", "{}").unwrap();

    let set = CredentialSet::logged_in(Some("a@b.com"), Some("ey.xyz"));
    store.write_credentials(&set, CommitMode::Transactional).unwrap();

    assert!(store.get("cachedUser").unwrap().is_none());
    assert_eq!(store.read_namespace(AUTH_NAMESPACE).unwrap().len(), 11);
}

#[test]
fn test_incremental_failure_is_partial() {
    let (_temp, store) = temp_store();
    store.ensure_schema().unwrap();
    poison_key(&store, "cursorAuth/token");

    let set = CredentialSet::logged_in(Some("a@b.com"), Some("ey.xyz"));
    let err = store
        .write_credentials(&set, CommitMode::Incremental)
        .unwrap_err();

    match err {
        StoreError::PartialCommit { key, written, .. } => {
            assert_eq!(key, "cursorAuth/token");
            assert_eq!(written, 8);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Keys before the failure persist.
    assert_eq!(store.get("isLoggedIn").unwrap().as_deref(), Some("true"));
    assert_eq!(store.get("accessToken").unwrap().as_deref(), Some("ey.xyz"));
    assert_eq!(store.get("refreshToken").unwrap(), None);
}

#[test]
fn test_transactional_failure_rolls_back() {
    let (_temp, store) = temp_store();
    store.upsert("email", "old@b.com").unwrap();
    poison_key(&store, "cursorAuth/token");

    let set = CredentialSet::logged_in(Some("a@b.com"), Some("ey.xyz"));
    let err = store
        .write_credentials(&set, CommitMode::Transactional)
        .unwrap_err();
    assert!(matches!(err, StoreError::Sqlite(_)), "unexpected error: {err}");

    assert_eq!(store.get("email").unwrap().as_deref(), Some("old@b.com"));
    assert_eq!(store.get("isLoggedIn").unwrap(), None);
}

#[test]
fn test_busy_detection() {
    let err = StoreError::Config("x".to_string());
    assert!(!err.is_busy());
}
