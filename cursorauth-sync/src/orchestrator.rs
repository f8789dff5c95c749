//! The sync retry state machine.

use std::time::Instant;

use cursorauth_core::{ClientMeta, CredentialSet, DEFAULT_CLIENT_VERSION};
use cursorauth_fetch::AccountSource;
use cursorauth_store::{CommitMode, Config, CredentialStateStore, TokenStore};
use tracing::{debug, error, info, instrument, warn};

use crate::error::SyncError;
use crate::outcome::{AttemptOutcome, SyncAttempt, SyncOutcome, SyncedAccount};
use crate::state::SyncState;

/// Provisioning attempts per run.
pub const MAX_ATTEMPTS: u32 = 3;

// ============================================================================
// Options
// ============================================================================

/// Settings for a sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Client version reported in [`ClientMeta`].
    pub client_version: String,
    /// How credentials are written.
    pub commit_mode: CommitMode,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            commit_mode: CommitMode::default(),
        }
    }
}

impl SyncOptions {
    /// Takes the sync settings from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self {
            client_version: config.client_version.clone(),
            commit_mode: CommitMode::from_flag(config.transactional_commit),
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Attempt history collected while the machine runs.
struct RunLog {
    attempts: Vec<SyncAttempt>,
    attempt_started: Instant,
}

impl RunLog {
    fn record(
        &mut self,
        attempt: u32,
        account_id: Option<String>,
        email: Option<String>,
        outcome: AttemptOutcome,
    ) {
        let duration = self.attempt_started.elapsed();
        debug!(attempt, outcome = outcome.label(), ?duration, "Attempt finished");
        self.attempts.push(SyncAttempt {
            attempt,
            account_id,
            email,
            outcome,
            duration,
        });
    }
}

/// Runs one credential sync against an [`AccountSource`].
pub struct SyncOrchestrator<S> {
    source: S,
    tokens: TokenStore,
    credentials: CredentialStateStore,
    options: SyncOptions,
}

impl<S: AccountSource> SyncOrchestrator<S> {
    /// Creates an orchestrator.
    pub fn new(
        source: S,
        tokens: TokenStore,
        credentials: CredentialStateStore,
        options: SyncOptions,
    ) -> Self {
        Self {
            source,
            tokens,
            credentials,
            options,
        }
    }

    /// Returns the account source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the run options.
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Runs the machine from [`SyncState::Start`] to a terminal state.
    #[instrument(skip(self), fields(mode = ?self.options.commit_mode))]
    pub async fn run(&self) -> SyncOutcome {
        let start = Instant::now();
        let mut log = RunLog {
            attempts: Vec::new(),
            attempt_started: start,
        };

        let mut state = SyncState::Start;
        let result = loop {
            state = match state {
                SyncState::Success(synced) => {
                    info!(email = %synced.email, keys = synced.keys_written, "Sync succeeded");
                    break Ok(synced);
                }
                SyncState::Failed(e) => {
                    error!(reason = e.reason_code(), error = %e, "Sync failed");
                    break Err(e);
                }
                other => {
                    debug!(state = %other, "Sync step");
                    self.step(other, &mut log).await
                }
            };
        };

        SyncOutcome {
            result,
            attempts: log.attempts,
            duration: start.elapsed(),
        }
    }

    async fn step(&self, state: SyncState, log: &mut RunLog) -> SyncState {
        match state {
            SyncState::Start => match self.tokens.get() {
                Ok(Some(token)) => SyncState::Clearing { token },
                Ok(None) => SyncState::Failed(SyncError::NoToken),
                Err(e) => SyncState::Failed(SyncError::File(e)),
            },

            SyncState::Clearing { token } => {
                match self.options.commit_mode {
                    CommitMode::Incremental => {
                        if let Err(e) = self.credentials.clear_auth_namespace() {
                            warn!(
                                busy = e.is_busy(),
                                error = %e,
                                "Clearing auth namespace failed, continuing"
                            );
                        }
                    }
                    CommitMode::Transactional => {
                        debug!("Namespace clear deferred to the commit transaction");
                    }
                }
                SyncState::Requesting { token, attempt: 1 }
            }

            SyncState::Requesting { token, attempt } => {
                log.attempt_started = Instant::now();
                info!(attempt, max = MAX_ATTEMPTS, "Requesting account");

                let meta = ClientMeta::current(self.options.client_version.as_str());
                match self.source.fetch_account(&token, &meta).await {
                    Ok(account) => SyncState::Validating {
                        token,
                        attempt,
                        account,
                    },
                    Err(e) if !e.is_retryable() => {
                        log.record(attempt, None, None, AttemptOutcome::Failed(e.to_string()));
                        SyncState::Failed(SyncError::Client(e))
                    }
                    Err(e) => {
                        warn!(attempt, kind = e.kind(), error = %e, "Attempt failed");
                        log.record(attempt, None, None, AttemptOutcome::Failed(e.to_string()));

                        if attempt < MAX_ATTEMPTS {
                            SyncState::Requesting {
                                token,
                                attempt: attempt + 1,
                            }
                        } else if e.is_network() {
                            SyncState::Failed(SyncError::NetworkExhausted { attempts: attempt, last: e })
                        } else {
                            SyncState::Failed(SyncError::NoUsableAccount { attempts: attempt })
                        }
                    }
                }
            }

            SyncState::Validating {
                token,
                attempt,
                account,
            } => {
                let id = account.id.clone();
                let email = account.email.clone();

                match account.into_usable() {
                    Ok(account) => SyncState::Committing { attempt, account },
                    Err(rejection) => {
                        info!(attempt, reason = %rejection, "Skipping account");
                        log.record(attempt, id, email, AttemptOutcome::rejected(&rejection));

                        if attempt < MAX_ATTEMPTS {
                            SyncState::Requesting {
                                token,
                                attempt: attempt + 1,
                            }
                        } else {
                            SyncState::Failed(SyncError::NoUsableAccount { attempts: attempt })
                        }
                    }
                }
            }

            SyncState::Committing { attempt, account } => {
                let set = CredentialSet::for_account(&account);
                match self
                    .credentials
                    .write_credentials(&set, self.options.commit_mode)
                {
                    Ok(written) => {
                        log.record(
                            attempt,
                            account.id.clone(),
                            Some(account.email.clone()),
                            AttemptOutcome::Committed,
                        );
                        SyncState::Success(SyncedAccount::new(&account, written))
                    }
                    Err(e) => {
                        if e.is_busy() {
                            warn!("Cursor state database is locked; close Cursor and retry");
                        }
                        log.record(
                            attempt,
                            account.id.clone(),
                            Some(account.email.clone()),
                            AttemptOutcome::Failed(e.to_string()),
                        );
                        SyncState::Failed(SyncError::Commit(e))
                    }
                }
            }

            terminal @ (SyncState::Success(_) | SyncState::Failed(_)) => terminal,
        }
    }
}

impl<S> std::fmt::Debug for SyncOrchestrator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncOrchestrator")
            .field("tokens", &self.tokens)
            .field("credentials", &self.credentials)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
