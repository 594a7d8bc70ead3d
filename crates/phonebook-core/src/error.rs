//! Error types for the phonebook client.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire phonebook client.
///
/// None of these variants are fatal: callers recover locally and surface
/// the message to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhonebookError {
    /// No session token is held, so no request was sent.
    #[error("Token is not available")]
    MissingToken,

    /// The auth endpoint answered without an `access_token`.
    #[error("Token not received")]
    MissingTokenInResponse,

    /// What a failed login always reports, whatever the cause was.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The request never produced a response (connect, timeout, ...).
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("Request failed with status code {status}: {body}")]
    Server { status: u16, body: String },

    /// Update/delete was asked for a record that has no id.
    #[error("Record has no id")]
    MissingRecordId,

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PhonebookError {
    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Server error
    pub fn server(status: u16, body: impl Into<String>) -> Self {
        Self::Server {
            status,
            body: body.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if the server rejected the credential (401/403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Server { status: 401 | 403, .. })
    }
}

impl From<serde_json::Error> for PhonebookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PhonebookError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PhonebookError>`.
pub type Result<T> = std::result::Result<T, PhonebookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            PhonebookError::MissingToken.to_string(),
            "Token is not available"
        );
        assert_eq!(
            PhonebookError::InvalidCredentials.to_string(),
            "invalid credentials"
        );
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(PhonebookError::server(401, "expired").is_unauthorized());
        assert!(!PhonebookError::server(500, "boom").is_unauthorized());
        assert!(!PhonebookError::network("refused").is_unauthorized());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: PhonebookError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(
            err,
            PhonebookError::Serialization { ref format, .. } if format == "JSON"
        ));
    }
}
