// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # cursorauth Sync
//!
//! Drives one credential sync: read the bearer token, clear the
//! `cursorAuth/` namespace, request accounts until a usable one arrives
//! (at most [`MAX_ATTEMPTS`]), and commit it into Cursor's state store.
//!
//! ```text
//! Start -> Clearing -> Requesting -> Validating -> Committing -> Success
//!                          ^             |
//!                          +-- retry ----+            (any) -> Failed
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use cursorauth_sync::{SyncOptions, SyncOrchestrator};
//!
//! let orchestrator = SyncOrchestrator::new(client, tokens, credentials, SyncOptions::default());
//! let outcome = orchestrator.run().await;
//! if let Err(e) = &outcome.result {
//!     eprintln!("sync failed ({}): {e}", e.reason_code());
//! }
//! ```

pub mod error;
pub mod orchestrator;
pub mod outcome;
pub mod state;

pub use error::SyncError;
pub use orchestrator::{MAX_ATTEMPTS, SyncOptions, SyncOrchestrator};
pub use outcome::{AttemptOutcome, SyncAttempt, SyncOutcome, SyncedAccount};
pub use state::SyncState;
