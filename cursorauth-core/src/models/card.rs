//! Activation card numbers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Exact length of an activation card number.
pub const CARD_NUMBER_LEN: usize = 16;

/// A validated activation card number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardNumber(String);

impl CardNumber {
    /// Parses a card number, trimming surrounding whitespace.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let card = input.trim();

        if card.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidCard(
                "card number must not contain whitespace".to_string(),
            ));
        }

        let len = card.chars().count();
        if len != CARD_NUMBER_LEN {
            return Err(CoreError::InvalidCard(format!(
                "expected {CARD_NUMBER_LEN} characters, got {len}"
            )));
        }

        Ok(Self(card.to_string()))
    }

    /// Returns the card number.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
