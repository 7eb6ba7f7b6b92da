//! Artifact downloads.

use std::path::Path;

use vros_core::{Manifest, SegmentNaming};
use vros_opendal::{StorageBackend, StorageResult};

use crate::{Result, TRACING_TARGET_FETCH};

/// Downloads remote artifacts (segments, manifests, traces) to local files.
#[async_trait::async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Copies the object named `remote` to `local`, replacing any existing
    /// file, and returns the number of bytes written.
    async fn fetch(&self, remote: &str, local: &Path) -> StorageResult<u64>;
}

#[async_trait::async_trait]
impl ArtifactFetcher for StorageBackend {
    async fn fetch(&self, remote: &str, local: &Path) -> StorageResult<u64> {
        StorageBackend::fetch(self, remote, local).await
    }
}

/// Prepares the local segment directory and downloads the video's manifest
/// into it.
///
/// # Errors
///
/// Fails when the directory cannot be created, the manifest cannot be
/// downloaded, or its contents are invalid.
pub async fn fetch_manifest<F>(fetcher: &F, naming: &SegmentNaming) -> Result<Manifest>
where
    F: ArtifactFetcher + ?Sized,
{
    tokio::fs::create_dir_all(naming.segment_dir()).await?;

    let remote = naming.remote_manifest();
    let local = naming.local_manifest();
    fetcher.fetch(&remote, &local).await?;

    let manifest = Manifest::load(&local).await?;
    tracing::info!(
        target: TRACING_TARGET_FETCH,
        video = naming.video(),
        segments = manifest.segment_count(),
        predictions = manifest.has_predictions(),
        "Manifest ready"
    );

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use vros_core::{PathId, PredictedPath, SegmentMetadata, Viewport};
    use vros_opendal::StorageConfig;

    use super::*;
    use crate::SessionError;

    fn sample_manifest() -> Manifest {
        let rectangle = Viewport::new(0, 10.0, 20.0, 640.0, 360.0).unwrap();
        Manifest::new([
            SegmentMetadata::new(
                Some(1024),
                vec![PredictedPath::new(PathId::new(0), vec![rectangle])],
            ),
            SegmentMetadata::new(Some(2048), Vec::new()),
        ])
    }

    #[tokio::test]
    async fn test_fetch_manifest_from_storage_backend() {
        let backend = StorageBackend::new(StorageConfig::Memory).unwrap();
        let manifest = sample_manifest();
        backend
            .write("rhino-manifest.txt", manifest.to_json().unwrap().as_bytes())
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let naming = SegmentNaming::new("rhino", dir.path().join("segments"));
        let fetched = fetch_manifest(&backend, &naming).await.unwrap();

        assert_eq!(fetched, manifest);
        assert!(naming.local_manifest().exists());
    }

    #[tokio::test]
    async fn test_missing_manifest_is_fatal() {
        let backend = StorageBackend::new(StorageConfig::Memory).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let naming = SegmentNaming::new("rhino", dir.path());

        let err = fetch_manifest(&backend, &naming).await.unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
    }

    #[tokio::test]
    async fn test_malformed_manifest_is_fatal() {
        let backend = StorageBackend::new(StorageConfig::Memory).unwrap();
        backend
            .write("rhino-manifest.txt", b"not json")
            .await
            .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let naming = SegmentNaming::new("rhino", dir.path());

        let err = fetch_manifest(&backend, &naming).await.unwrap_err();
        assert!(matches!(err, SessionError::Data(_)));
    }
}
