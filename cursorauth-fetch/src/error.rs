//! Fetch error types.

use thiserror::Error;

/// Error type for provisioning service calls.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response.
    #[error("HTTP {status} from {endpoint}: {detail}")]
    Status {
        /// Endpoint path that was called.
        endpoint: &'static str,
        /// HTTP status code.
        status: u16,
        /// `detail` from the error body, or the status reason.
        detail: String,
    },

    /// Body was not JSON or did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Well-formed 2xx body carrying a business-level error.
    #[error("Server rejected request: {0}")]
    ServerRejection(String),

    /// Neither the issued nor the fallback refresh token was usable.
    #[error("No usable token: {0}")]
    TokenUnresolved(String),

    /// Client could not be configured.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl FetchError {
    /// Returns true for request-level failures: transport or HTTP status.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }

    /// Returns true if another provisioning attempt may succeed.
    ///
    /// Only a client that could not be built is hopeless; a malformed body
    /// costs an attempt like any other bad answer.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidConfig(_))
    }

    /// Short machine-readable category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) | Self::Status { .. } => "network_error",
            Self::MalformedResponse(_) => "malformed_response",
            Self::ServerRejection(_) => "server_rejection",
            Self::TokenUnresolved(_) => "token_unresolved",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }
}
