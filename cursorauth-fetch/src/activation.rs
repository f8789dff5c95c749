//! Card check and activation.

use cursorauth_core::CardNumber;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::client::{ServiceHttp, read_json};
use crate::error::FetchError;

/// Card activation endpoint.
pub const ACTIVATE_ENDPOINT: &str = "/auth/activate-card";

/// Card status endpoint prefix; the card number is appended.
pub const CHECK_ENDPOINT: &str = "/cards/check";

/// State of a card as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStatus {
    /// Whether the card has been activated before.
    #[serde(default)]
    pub is_used: bool,
    /// Validity period in days.
    #[serde(default)]
    pub days: Option<u64>,
}

/// Result of a card activation.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Activation {
    /// Bearer token to store locally.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl std::fmt::Debug for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Activation")
            .field("access_token", &self.access_token.as_ref().map(|_| "******"))
            .finish()
    }
}

#[derive(Serialize)]
struct ActivateRequest<'a> {
    card_number: &'a str,
}

/// Client for the card endpoints.
#[derive(Debug, Clone)]
pub struct ActivationClient {
    http: ServiceHttp,
}

impl ActivationClient {
    /// Creates a client on top of a shared [`ServiceHttp`].
    pub fn new(http: ServiceHttp) -> Self {
        Self { http }
    }

    /// Looks up a card. A non-2xx response means the card is unknown.
    #[instrument(skip(self, card))]
    pub async fn check_card(&self, card: &CardNumber) -> Result<CardStatus, FetchError> {
        let encoded: String = url::form_urlencoded::byte_serialize(card.as_str().as_bytes()).collect();
        let path = format!("{CHECK_ENDPOINT}/{encoded}");

        let response = self.http.get(&path).send().await?;
        let body = read_json(response, CHECK_ENDPOINT).await?;

        let status: CardStatus = serde_json::from_value(body)
            .map_err(|e| FetchError::MalformedResponse(format!("{CHECK_ENDPOINT}: {e}")))?;

        debug!(is_used = status.is_used, days = ?status.days, "Card checked");
        Ok(status)
    }

    /// Activates a card and returns the issued bearer token, if any.
    #[instrument(skip(self, card))]
    pub async fn activate_card(&self, card: &CardNumber) -> Result<Activation, FetchError> {
        let response = self
            .http
            .post(ACTIVATE_ENDPOINT)
            .json(&ActivateRequest {
                card_number: card.as_str(),
            })
            .send()
            .await?;

        let body = read_json(response, ACTIVATE_ENDPOINT).await?;
        if !body.is_object() {
            return Err(FetchError::MalformedResponse(format!(
                "{ACTIVATE_ENDPOINT}: expected a JSON object"
            )));
        }

        let activation: Activation = serde_json::from_value(body)
            .map_err(|e| FetchError::MalformedResponse(format!("{ACTIVATE_ENDPOINT}: {e}")))?;

        info!(issued = activation.access_token.is_some(), "Card activated");
        Ok(activation)
    }
}
