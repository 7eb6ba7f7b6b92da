//! S3 bucket settings.

use serde::{Deserialize, Serialize};

/// Bucket holding segments, manifests and traces when none is configured.
pub const DEFAULT_BUCKET: &str = "vros-video-segments";

/// Region of [`DEFAULT_BUCKET`].
pub const DEFAULT_REGION: &str = "us-east-1";

/// Bucket, region and optional endpoint/credentials of the S3 store
/// holding a video's artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Config {
    /// Bucket holding `<video>-full/`, `<video>-fov/` and manifests.
    pub bucket: String,
    /// Region of the bucket.
    pub region: String,
    /// Custom endpoint URL (for S3-compatible storage like MinIO).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Access key ID; the default AWS credential chain is used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Secret paired with `access_key_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

impl S3Config {
    /// Targets `bucket` in `region` with the default credential chain.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Points the client at an S3-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets static access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }
}

impl Default for S3Config {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKET, DEFAULT_REGION)
    }
}
