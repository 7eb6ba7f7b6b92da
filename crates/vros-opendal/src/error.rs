//! Storage error types.

use std::io;
use std::path::{Path, PathBuf};

/// Result type for storage operations.
pub type StorageResult<T, E = StorageError> = Result<T, E>;

/// Failures while reaching remote artifacts or storing local copies.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be set up from its configuration.
    #[error("cannot initialize storage backend: {0}")]
    Init(String),

    /// The requested object does not exist.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Credentials do not grant access to the object.
    #[error("access denied: {0}")]
    PermissionDenied(String),

    /// The object could not be transferred; a later attempt may succeed.
    #[error("transfer of '{remote}' failed: {reason}")]
    Transfer { remote: String, reason: String },

    /// The local copy could not be written.
    #[error("cannot write {}: {source}", path.display())]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Any other backend failure.
    #[error(transparent)]
    Backend(opendal::Error),
}

impl StorageError {
    /// Creates an initialization error.
    pub fn init(reason: impl Into<String>) -> Self {
        Self::Init(reason.into())
    }

    /// Creates a not-found error for `remote`.
    pub fn not_found(remote: impl Into<String>) -> Self {
        Self::NotFound(remote.into())
    }

    /// Creates a transfer error for `remote`.
    pub fn transfer(remote: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transfer {
            remote: remote.into(),
            reason: reason.into(),
        }
    }

    /// Creates a local write error for `path`.
    pub fn local_write(path: &Path, source: io::Error) -> Self {
        Self::LocalWrite {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true if a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transfer { .. } => true,
            Self::Backend(err) => err.is_temporary(),
            Self::Init(_) | Self::NotFound(_) | Self::PermissionDenied(_) | Self::LocalWrite { .. } => {
                false
            }
        }
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        match err.kind() {
            opendal::ErrorKind::NotFound => Self::NotFound(err.to_string()),
            opendal::ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}
