//! Transport error types.

use std::io;
use std::time::Duration;

use crate::ServerMessage;

/// Result type for transport operations.
pub type Result<T, E = TransportError> = std::result::Result<T, E>;

/// Errors raised while talking to the negotiation server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    /// Reading from or writing to the connection failed.
    #[error("connection I/O error: {0}")]
    Io(#[from] io::Error),

    /// A message could not be encoded or decoded.
    #[error("message codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// The peer did not answer in time.
    #[error("operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    /// The peer closed the connection before responding.
    #[error("connection closed by peer")]
    Closed,

    /// The peer answered with a message of the wrong kind.
    #[error("expected {expected} response, received {received}")]
    UnexpectedResponse {
        expected: &'static str,
        received: String,
    },

    /// Invalid transport configuration.
    #[error("invalid transport configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl TransportError {
    /// Creates a connect error for `address`.
    pub fn connect(address: impl Into<String>, source: io::Error) -> Self {
        Self::Connect {
            address: address.into(),
            source,
        }
    }

    /// Creates an unexpected response error.
    pub fn unexpected(expected: &'static str, received: &ServerMessage) -> Self {
        Self::UnexpectedResponse {
            expected,
            received: format!("{received:?}"),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}
