//! Error types for manifest, trace and geometry operations.

use std::path::PathBuf;

use crate::fov::{FrameIndex, PathId, SegmentId};

/// Result type for all operations in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Unified error type for the vros data model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The segment storage directory does not exist.
    #[error("segment directory '{}' does not exist", path.display())]
    StorageDirMissing { path: PathBuf },

    /// The segment storage path exists but is not a directory.
    #[error("segment path '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// A segment id outside `[1, segment_count]` was requested.
    #[error("segment {segment_id} is out of range (segment count is {segment_count})")]
    OutOfRange {
        segment_id: SegmentId,
        segment_count: u32,
    },

    /// The viewport trace has no sample for the requested frame.
    #[error("viewport trace has no sample for frame {frame}")]
    MissingViewport { frame: FrameIndex },

    /// A segment has no predicted path with the requested id.
    #[error("segment {segment_id} has no predicted path {path_id}")]
    UnknownPath {
        segment_id: SegmentId,
        path_id: PathId,
    },

    /// A viewport rectangle with non-positive or non-finite geometry.
    #[error("invalid viewport geometry: {reason}")]
    InvalidViewport { reason: String },

    /// A trace line could not be parsed.
    #[error("invalid trace line {line}: {reason}")]
    InvalidTraceLine { line: usize, reason: String },

    /// A manifest document is structurally inconsistent.
    #[error("invalid manifest: {reason}")]
    InvalidManifest { reason: String },

    /// Underlying filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Creates an invalid viewport error.
    pub fn invalid_viewport(reason: impl Into<String>) -> Self {
        Self::InvalidViewport {
            reason: reason.into(),
        }
    }

    /// Creates an invalid trace line error.
    pub fn invalid_trace_line(line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTraceLine {
            line,
            reason: reason.into(),
        }
    }

    /// Creates an invalid manifest error.
    pub fn invalid_manifest(reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let error = Error::OutOfRange {
            segment_id: SegmentId::new(7),
            segment_count: 3,
        };
        assert_eq!(
            error.to_string(),
            "segment 7 is out of range (segment count is 3)"
        );
    }
}
