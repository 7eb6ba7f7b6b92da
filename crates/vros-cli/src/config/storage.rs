//! Storage backend selection.

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use vros_opendal::{DEFAULT_BUCKET, DEFAULT_REGION, FsConfig, S3Config, StorageConfig};

/// Where segments, manifests and traces are downloaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Local directory.
    Fs,
    /// S3 bucket.
    S3,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct StorageArgs {
    /// Storage backend holding the video's artifacts.
    #[arg(long, env = "VROS_STORAGE", value_enum, default_value_t = StorageKind::S3)]
    pub storage: StorageKind,

    /// Root directory of the `fs` backend.
    #[arg(long, env = "VROS_STORAGE_ROOT", default_value = ".")]
    pub storage_root: String,

    /// Bucket of the `s3` backend.
    #[arg(long, env = "VROS_S3_BUCKET", default_value = DEFAULT_BUCKET)]
    pub s3_bucket: String,

    /// Region of the `s3` backend.
    #[arg(long, env = "VROS_S3_REGION", default_value = DEFAULT_REGION)]
    pub s3_region: String,

    /// Custom endpoint of an S3-compatible store.
    #[arg(long, env = "VROS_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Static access key of the `s3` backend.
    #[arg(long, env = "VROS_S3_ACCESS_KEY_ID", requires = "s3_secret_access_key")]
    pub s3_access_key_id: Option<String>,

    /// Secret paired with `--s3-access-key-id`.
    #[arg(
        long,
        env = "VROS_S3_SECRET_ACCESS_KEY",
        hide_env_values = true,
        requires = "s3_access_key_id"
    )]
    #[serde(skip_serializing)]
    pub s3_secret_access_key: Option<String>,
}

impl StorageArgs {
    /// Builds the backend configuration. S3 credentials come from the
    /// default AWS credential chain unless a static key pair is given.
    pub fn to_config(&self) -> StorageConfig {
        match self.storage {
            StorageKind::Fs => StorageConfig::Fs(FsConfig::new(&self.storage_root)),
            StorageKind::S3 => {
                let mut config = S3Config::new(&self.s3_bucket, &self.s3_region);
                if let Some(endpoint) = &self.s3_endpoint {
                    config = config.with_endpoint(endpoint);
                }
                if let (Some(key_id), Some(secret)) =
                    (&self.s3_access_key_id, &self.s3_secret_access_key)
                {
                    config = config.with_credentials(key_id, secret);
                }
                StorageConfig::S3(config)
            }
        }
    }
}

#[cfg(test)]
impl StorageArgs {
    /// Local directory storage rooted at `root`.
    pub(crate) fn local(root: &std::path::Path) -> Self {
        Self {
            storage: StorageKind::Fs,
            storage_root: root.display().to_string(),
            s3_bucket: DEFAULT_BUCKET.to_owned(),
            s3_region: DEFAULT_REGION.to_owned(),
            s3_endpoint: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(storage: StorageKind) -> StorageArgs {
        StorageArgs {
            storage,
            storage_root: "/data".to_owned(),
            s3_bucket: DEFAULT_BUCKET.to_owned(),
            s3_region: DEFAULT_REGION.to_owned(),
            s3_endpoint: Some("http://localhost:9000".to_owned()),
            s3_access_key_id: None,
            s3_secret_access_key: None,
        }
    }

    #[test]
    fn test_to_config() {
        assert_eq!(
            args(StorageKind::Fs).to_config(),
            StorageConfig::Fs(FsConfig::new("/data"))
        );
        assert_eq!(
            args(StorageKind::S3).to_config(),
            StorageConfig::S3(
                S3Config::new("vros-video-segments", "us-east-1")
                    .with_endpoint("http://localhost:9000")
            )
        );
    }

    #[test]
    fn test_static_credentials() {
        let mut args = args(StorageKind::S3);
        args.s3_access_key_id = Some("minio".to_owned());
        args.s3_secret_access_key = Some("minio-secret".to_owned());

        let StorageConfig::S3(config) = args.to_config() else {
            panic!("expected s3 config");
        };
        assert_eq!(config.access_key_id.as_deref(), Some("minio"));
        assert_eq!(config.secret_access_key.as_deref(), Some("minio-secret"));
    }
}
