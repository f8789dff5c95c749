//! Cursor's `state.vscdb` credential namespace.
//!
//! Cursor keeps its global state in a single SQLite table, `ItemTable`, of
//! `(key, value)` rows. This module only ever touches keys under
//! [`AUTH_NAMESPACE`]. Every operation opens its own connection and closes
//! it on return, so no connection outlives a call. Lock contention with a
//! running Cursor is left to SQLite's busy timeout.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use cursorauth_core::{AUTH_NAMESPACE, CredentialSet, auth_key};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument, warn};

use crate::error::StoreError;

/// Email reported when the namespace has none.
pub const UNKNOWN_EMAIL: &str = "unknown";

const CREATE_TABLE_SQL: &str =
    "CREATE TABLE IF NOT EXISTS ItemTable (key TEXT PRIMARY KEY, value TEXT)";

const UPSERT_SQL: &str = "INSERT INTO ItemTable (key, value) VALUES (?1, ?2) \
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";

/// Case-sensitive prefix delete, bound to [`AUTH_NAMESPACE`]. `LIKE` would
/// also match `CURSORAUTH/` and friends.
const CLEAR_NAMESPACE_SQL: &str = "DELETE FROM ItemTable WHERE substr(key, 1, length(?1)) = ?1";

// ============================================================================
// Commit Mode
// ============================================================================

/// How a credential set is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitMode {
    /// One autocommitted upsert per key. A failure leaves earlier keys
    /// written.
    #[default]
    Incremental,
    /// Clear the namespace and write every key in a single transaction.
    Transactional,
}

impl CommitMode {
    /// Maps the `transactional_commit` config flag to a mode.
    pub fn from_flag(transactional: bool) -> Self {
        if transactional {
            Self::Transactional
        } else {
            Self::Incremental
        }
    }
}

// ============================================================================
// Auth Info
// ============================================================================

/// Current contents of the namespace, with defaults for absent fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthInfo {
    /// `email` field, or [`UNKNOWN_EMAIL`].
    pub email: String,
    /// `accessToken` field.
    pub access_token: Option<String>,
    /// `refreshToken` field.
    pub refresh_token: Option<String>,
    /// Every field in the namespace, prefix stripped.
    pub fields: BTreeMap<String, String>,
}

impl AuthInfo {
    /// Builds auth info from namespace fields.
    pub fn from_fields(fields: BTreeMap<String, String>) -> Self {
        Self {
            email: fields
                .get("email")
                .cloned()
                .unwrap_or_else(|| UNKNOWN_EMAIL.to_string()),
            access_token: fields.get("accessToken").cloned(),
            refresh_token: fields.get("refreshToken").cloned(),
            fields,
        }
    }

    /// Returns true if Cursor's `isLoggedIn` flag is set.
    pub fn is_logged_in(&self) -> bool {
        self.fields.get("isLoggedIn").is_some_and(|v| v == "true")
    }
}

impl fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthInfo")
            .field("email", &self.email)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("fields", &self.fields.len())
            .finish()
    }
}

// ============================================================================
// Credential State Store
// ============================================================================

/// Namespaced access to Cursor's state table.
#[derive(Debug, Clone)]
pub struct CredentialStateStore {
    db_path: PathBuf,
}

impl CredentialStateStore {
    /// Creates a store for the database at `db_path`.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Returns the database path.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Opens a session: creates the parent directory, connects, and makes
    /// sure the table exists.
    fn session(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!(path = %parent.display(), "Creating state directory");
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.db_path)?;
        conn.execute(CREATE_TABLE_SQL, [])?;
        Ok(conn)
    }

    /// Creates the table if it does not exist.
    #[instrument(skip(self), fields(path = %self.db_path.display()))]
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        self.session().map(drop)
    }

    /// Deletes every row under the namespace. Returns the number removed.
    #[instrument(skip(self), fields(path = %self.db_path.display()))]
    pub fn clear_auth_namespace(&self) -> Result<usize, StoreError> {
        let conn = self.session()?;
        let removed = conn.execute(CLEAR_NAMESPACE_SQL, params![AUTH_NAMESPACE])?;
        info!(removed, "Cleared auth namespace");
        Ok(removed)
    }

    /// Inserts or updates a single field.
    #[instrument(skip(self, value), fields(path = %self.db_path.display()))]
    pub fn upsert(&self, field: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.session()?;
        conn.execute(UPSERT_SQL, params![auth_key(field), value])?;
        Ok(())
    }

    /// Reads a single field.
    pub fn get(&self, field: &str) -> Result<Option<String>, StoreError> {
        let conn = self.session()?;
        let value = conn
            .query_row(
                "SELECT value FROM ItemTable WHERE key = ?1",
                params![auth_key(field)],
                |row| row.get::<_, Value>(0),
            )
            .optional()?;
        Ok(value.map(value_to_string))
    }

    /// Deletes a single field. Returns false if it did not exist.
    pub fn delete(&self, field: &str) -> Result<bool, StoreError> {
        let conn = self.session()?;
        let removed = conn.execute("DELETE FROM ItemTable WHERE key = ?1", params![auth_key(field)])?;
        Ok(removed > 0)
    }

    /// Returns every key starting with `prefix`, with the prefix stripped.
    #[instrument(skip(self), fields(path = %self.db_path.display()))]
    pub fn read_namespace(&self, prefix: &str) -> Result<BTreeMap<String, String>, StoreError> {
        let conn = self.session()?;
        read_prefix(&conn, prefix)
    }

    /// Reads the namespace into an [`AuthInfo`].
    pub fn auth_info(&self) -> Result<AuthInfo, StoreError> {
        self.read_namespace(AUTH_NAMESPACE).map(AuthInfo::from_fields)
    }

    /// Writes a credential set. Returns the number of keys written.
    ///
    /// In [`CommitMode::Incremental`] each key is its own statement; the
    /// first failure is returned as [`StoreError::PartialCommit`] and the
    /// keys before it stay written. In [`CommitMode::Transactional`] the
    /// namespace is cleared and rewritten atomically, and a failed write is
    /// returned as [`StoreError::Sqlite`] after the rollback.
    #[instrument(skip(self, set), fields(path = %self.db_path.display(), keys = set.len()))]
    pub fn write_credentials(
        &self,
        set: &CredentialSet,
        mode: CommitMode,
    ) -> Result<usize, StoreError> {
        let mut conn = self.session()?;

        let written = match mode {
            CommitMode::Incremental => upsert_all(&conn, set)?,
            CommitMode::Transactional => {
                let tx = conn.transaction()?;
                let removed = tx.execute(CLEAR_NAMESPACE_SQL, params![AUTH_NAMESPACE])?;
                debug!(removed, "Cleared auth namespace inside transaction");
                // Dropping the transaction rolls back, so nothing is partial.
                let written = upsert_all(&tx, set).map_err(|e| match e {
                    StoreError::PartialCommit { source, .. } => StoreError::Sqlite(source),
                    other => other,
                })?;
                tx.commit()?;
                written
            }
        };

        info!(written, ?mode, "Credentials committed");
        log_namespace(&conn);
        Ok(written)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn upsert_all(conn: &Connection, set: &CredentialSet) -> Result<usize, StoreError> {
    let mut written = 0;
    for (key, value) in set.keyed() {
        match conn.execute(UPSERT_SQL, params![key, value]) {
            Ok(_) => {
                debug!(field = key.trim_start_matches(AUTH_NAMESPACE), "Updated");
                written += 1;
            }
            Err(source) => {
                warn!(key = %key, written, error = %source, "Credential write failed");
                return Err(StoreError::PartialCommit {
                    key,
                    written,
                    source,
                });
            }
        }
    }
    Ok(written)
}

fn read_prefix(conn: &Connection, prefix: &str) -> Result<BTreeMap<String, String>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT key, value FROM ItemTable WHERE substr(key, 1, length(?1)) = ?1")?;

    let rows = stmt.query_map(params![prefix], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, Value>(1)?))
    })?;

    let mut fields = BTreeMap::new();
    for row in rows {
        let (key, value) = row?;
        if let Some(field) = key.strip_prefix(prefix) {
            fields.insert(field.to_string(), value_to_string(value));
        }
    }
    Ok(fields)
}

/// Cursor writes some values as BLOBs, so any storage class is accepted.
fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => String::from_utf8_lossy(&b).into_owned(),
    }
}

/// Dumps the namespace at debug level with token values masked.
fn log_namespace(conn: &Connection) {
    match read_prefix(conn, AUTH_NAMESPACE) {
        Ok(fields) => {
            for (field, value) in &fields {
                if field.to_lowercase().contains("token") {
                    debug!(field = %field, value = "******", "Namespace entry");
                } else {
                    debug!(field = %field, value = %value, "Namespace entry");
                }
            }
        }
        Err(e) => warn!(error = %e, "Could not read back auth namespace"),
    }
}
