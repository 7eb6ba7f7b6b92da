//! Prelude module for convenient imports.

pub use crate::backend::StorageBackend;
pub use crate::config::{FsConfig, S3Config, StorageConfig};
pub use crate::error::{StorageError, StorageResult};
