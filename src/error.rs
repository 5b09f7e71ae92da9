//! Error types for the toutsurmoneau.fr portal client.
//!
//! Network failures, rejected logins, missing page content and malformed
//! consumption payloads are kept apart so callers can react to each one
//! differently (e.g. prompt for new credentials vs. try again later).

use crate::model::FetchStage;
use thiserror::Error;

/// Result type alias using our custom error types.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error type returned by the portal client.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration-related errors
    #[error("configuration error")]
    Config(#[from] ConfigError),

    /// The portal could not be reached or answered with an error status
    #[error("transport error")]
    Transport(#[from] TransportError),

    /// The login form was accepted but no session cookie was issued
    #[error("login error: please check your username/password")]
    Authentication,

    /// An expected fragment was absent from a portal page
    #[error("{0} not found")]
    DataNotFound(String),

    /// A consumption payload could not be interpreted
    #[error("issue with {stage} data")]
    DataParse {
        stage: FetchStage,
        #[source]
        source: ParseError,
    },
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable parsing failed
    #[error("failed to parse environment variables: {0}")]
    EnvParse(String),

    /// Configuration value is invalid
    #[error("invalid configuration value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Network-level failures, distinct from parse and data errors.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request failed (connection refused, timeout, unreadable body)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("server error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// The post-login URL does not carry a host
    #[error("unexpected response URL: {0}")]
    UnexpectedUrl(String),
}

/// Consumption payload parsing errors.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Response body is not JSON
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse numeric value
    #[error("failed to parse number from '{text}': {message}")]
    NumberParse { text: String, message: String },

    /// A series does not have an entry at the expected position
    #[error("no entry at index {index}")]
    MissingEntry { index: usize },

    /// Payload does not have the expected shape
    #[error("unexpected payload structure: {0}")]
    UnexpectedStructure(String),
}

impl ConfigError {
    /// Creates a new environment parse error.
    pub fn env_parse(err: impl std::fmt::Display) -> Self {
        Self::EnvParse(err.to_string())
    }

    /// Creates a new invalid configuration error.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl TransportError {
    /// Creates a status error from HTTP status and response body.
    pub fn status(status: reqwest::StatusCode, body: String) -> Self {
        Self::Status {
            status: status.as_u16(),
            message: body,
        }
    }
}

impl ParseError {
    /// Creates a number parse error.
    pub fn number_parse(text: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::NumberParse {
            text: text.into(),
            message: err.to_string(),
        }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::UnexpectedStructure(message.into())
    }
}

impl Error {
    /// Creates a data parse error for the given fetch stage.
    pub fn data_parse(stage: FetchStage, source: ParseError) -> Self {
        Self::DataParse { stage, source }
    }

    /// Creates a data not found error.
    pub fn data_not_found(what: impl Into<String>) -> Self {
        Self::DataNotFound(what.into())
    }

    /// Returns true when the portal rejected the credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication)
    }
}
