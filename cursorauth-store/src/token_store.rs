//! Bearer token and activation card files.
//!
//! Both live as raw text under `~/.cursor_auth/`: the bearer token in
//! `token`, the last activated card in `card`. They are not encrypted; on
//! Unix the files are created owner-readable only.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

use cursorauth_core::{BearerToken, CardNumber};
use tracing::{debug, instrument, warn};

use crate::error::StoreError;

/// File name of the saved card, next to the token file.
pub const CARD_FILE_NAME: &str = "card";

// ============================================================================
// Private File
// ============================================================================

/// A small owner-only text file.
#[derive(Debug, Clone)]
struct PrivateFile {
    path: PathBuf,
}

impl PrivateFile {
    /// Reads the trimmed content. Missing or blank is `None`.
    fn read(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "File not found");
                Ok(None)
            }
            Err(source) => Err(self.error(source)),
        }
    }

    fn write(&self, content: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.error(e))?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&self.path).map_err(|e| self.error(e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| self.error(e))
    }

    fn remove(&self) -> Result<bool, StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(self.error(source)),
        }
    }

    fn error(&self, source: std::io::Error) -> StoreError {
        StoreError::File {
            path: self.path.clone(),
            source,
        }
    }
}

// ============================================================================
// Token Store
// ============================================================================

/// Store for the single bearer token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    file: PrivateFile,
}

impl TokenStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: PrivateFile { path: path.into() },
        }
    }

    /// Returns the token file path.
    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Reads the token.
    ///
    /// A missing or blank file is `Ok(None)`. Other filesystem errors are
    /// returned.
    #[instrument(skip(self), fields(path = %self.file.path.display()))]
    pub fn get(&self) -> Result<Option<BearerToken>, StoreError> {
        Ok(self.file.read()?.and_then(|t| BearerToken::new(t).ok()))
    }

    /// Writes the token, replacing any previous value.
    #[instrument(skip(self, token), fields(path = %self.file.path.display()))]
    pub fn save(&self, token: &str) -> Result<(), StoreError> {
        self.file.write(token)?;
        debug!("Token saved");
        Ok(())
    }

    /// Deletes the token file. Returns false if there was none.
    #[instrument(skip(self), fields(path = %self.file.path.display()))]
    pub fn clear(&self) -> Result<bool, StoreError> {
        let removed = self.file.remove()?;
        debug!(removed, "Token file cleared");
        Ok(removed)
    }
}

// ============================================================================
// Card Store
// ============================================================================

/// Store for the last successfully activated card, used to re-issue a
/// bearer token without typing the card again.
#[derive(Debug, Clone)]
pub struct CardStore {
    file: PrivateFile,
}

impl CardStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: PrivateFile { path: path.into() },
        }
    }

    /// Returns the card file path.
    pub fn path(&self) -> &Path {
        &self.file.path
    }

    /// Reads the saved card. A file that no longer parses is ignored.
    pub fn get(&self) -> Result<Option<CardNumber>, StoreError> {
        let Some(content) = self.file.read()? else {
            return Ok(None);
        };
        match CardNumber::parse(&content) {
            Ok(card) => Ok(Some(card)),
            Err(e) => {
                warn!(path = %self.file.path.display(), error = %e, "Ignoring invalid saved card");
                Ok(None)
            }
        }
    }

    /// Remembers a card, replacing any previous one.
    pub fn save(&self, card: &CardNumber) -> Result<(), StoreError> {
        self.file.write(card.as_str())
    }

    /// Forgets the saved card. Returns false if there was none.
    pub fn clear(&self) -> Result<bool, StoreError> {
        self.file.remove()
    }
}

// ============================================================================
// Tests
// ============================================================================
