//! Client metadata sent with provisioning requests.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Client version reported when none is configured.
pub const DEFAULT_CLIENT_VERSION: &str = "1.0.0";

/// Body of a provisioning request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientMeta {
    /// Client version string.
    pub client_version: String,
    /// Lowercase platform name.
    pub system: String,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
}

impl ClientMeta {
    /// Builds metadata for the running platform at the current time.
    pub fn current(client_version: impl Into<String>) -> Self {
        Self {
            client_version: client_version.into(),
            system: platform_name(std::env::consts::OS).to_string(),
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// Maps Rust's OS name to the name the provisioning service expects.
fn platform_name(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_name() {
        assert_eq!(platform_name("macos"), "darwin");
        assert_eq!(platform_name("windows"), "windows");
        assert_eq!(platform_name("linux"), "linux");
        assert_eq!(platform_name("freebsd"), "freebsd");
    }

    #[test]
    fn test_current_meta() {
        let meta = ClientMeta::current(DEFAULT_CLIENT_VERSION);
        assert_eq!(meta.client_version, "1.0.0");
        assert!(!meta.system.is_empty());
        assert!(meta.timestamp > 1_600_000_000);
    }
}
