//! Core error types for `cursorauth`.

use thiserror::Error;

/// Core error type for `cursorauth` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Card number failed validation.
    #[error("Invalid card number: {0}")]
    InvalidCard(String),

    /// Bearer token was empty.
    #[error("Bearer token is empty")]
    EmptyToken,
}
