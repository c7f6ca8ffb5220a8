use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Reset link does not contain a token")]
pub struct MissingTokenError;

/// Token from a password-reset link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken(String);

impl ResetToken {
    /// Pull the `token` parameter out of a reset link.
    ///
    /// Accepts a full URL, a bare query (`?token=...`), or the query without
    /// its leading `?`. Any fragment is ignored.
    pub fn from_link(link: &str) -> Result<Self, MissingTokenError> {
        let link = link.trim();
        let link = link.split_once('#').map_or(link, |(before, _)| before);
        let query = link.split_once('?').map_or(link, |(_, query)| query);

        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "token")
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .map(|value| ResetToken(value.to_string()))
            .ok_or(MissingTokenError)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResetToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
