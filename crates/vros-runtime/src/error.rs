//! Session error types.

use vros_opendal::StorageError;
use vros_transport::TransportError;

/// Result type for session operations.
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Failures that end a session.
///
/// Artifact download failures during segment processing are not session
/// errors; they are recorded in the [`SessionReport`](crate::SessionReport)
/// and the session moves on to the next segment.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The negotiation server could not be reached or answered badly.
    #[error("negotiation failed: {0}")]
    Transport(#[from] TransportError),

    /// Manifest or trace data did not cover what the protocol needed.
    #[error(transparent)]
    Data(#[from] vros_core::Error),

    /// Downloading a session input failed.
    #[error("storage failure: {0}")]
    Storage(#[from] StorageError),

    /// Preparing the local segment directory failed.
    #[error("local I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid session configuration.
    #[error("invalid session configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl SessionError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use vros_core::SegmentId;

    use super::*;

    #[test]
    fn test_data_errors_are_transparent() {
        let err = SessionError::from(vros_core::Error::MissingViewport { frame: 42 });
        assert_eq!(
            err.to_string(),
            vros_core::Error::MissingViewport { frame: 42 }.to_string()
        );

        let err = SessionError::from(vros_core::Error::OutOfRange {
            segment_id: SegmentId::new(9),
            segment_count: 3,
        });
        assert!(matches!(err, SessionError::Data(_)));
    }
}
