//! Composite routing key `(participant, currency)`

use std::fmt;

use serde::Serialize;

use crate::error::DispatchError;

/// ISO-4217 alphabetic currency code, stored upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn parse(code: &str) -> Result<Self, DispatchError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DispatchError::UnresolvedRoutingKey(format!(
                "invalid currency code {:?}",
                code
            )));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies exactly one peer endpoint.
///
/// Both parts are validated at construction, so a `RoutingKey` that exists is
/// always fully resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutingKey {
    participant_id: String,
    currency: Currency,
}

impl RoutingKey {
    pub fn new(participant_id: &str, currency: &str) -> Result<Self, DispatchError> {
        let currency = Currency::parse(currency)?;
        Self::with_currency(participant_id, currency)
    }

    pub fn with_currency(participant_id: &str, currency: Currency) -> Result<Self, DispatchError> {
        if participant_id.is_empty() || participant_id.chars().any(char::is_whitespace) {
            return Err(DispatchError::UnresolvedRoutingKey(format!(
                "invalid participant id {:?}",
                participant_id
            )));
        }
        Ok(Self {
            participant_id: participant_id.to_string(),
            currency,
        })
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Table form: `{participant}-{currency}` with lower-case currency
    pub fn to_table_key(&self) -> String {
        format!(
            "{}-{}",
            self.participant_id,
            self.currency.as_str().to_ascii_lowercase()
        )
    }
}

impl fmt::Display for RoutingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_table_key())
    }
}

impl Serialize for RoutingKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_table_key())
    }
}
