mod config;

pub use config::{DEFAULT_BUCKET, DEFAULT_REGION, S3Config};
