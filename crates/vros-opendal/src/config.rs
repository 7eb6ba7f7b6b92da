//! Storage configuration types.

use serde::{Deserialize, Serialize};

pub use crate::fs::FsConfig;
pub use crate::s3::S3Config;

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum StorageConfig {
    /// In-process memory store, empty at startup.
    Memory,
    /// Local filesystem directory.
    Fs(FsConfig),
    /// Amazon S3 compatible storage.
    S3(S3Config),
}

impl StorageConfig {
    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Fs(_) => "fs",
            Self::S3(_) => "s3",
        }
    }

    /// Returns the root (directory, bucket) objects are resolved against.
    pub fn root(&self) -> &str {
        match self {
            Self::Memory => "/",
            Self::Fs(config) => &config.root,
            Self::S3(config) => &config.bucket,
        }
    }
}
