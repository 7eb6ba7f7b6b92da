#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod config;
mod error;
mod fs;
mod s3;

#[doc(hidden)]
pub mod prelude;

pub use backend::StorageBackend;
pub use config::{FsConfig, S3Config, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use s3::{DEFAULT_BUCKET, DEFAULT_REGION};

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "vros_opendal";
