//! Storage backend implementation.

use std::path::Path;
use std::time::Instant;

use opendal::{Operator, services};

use crate::TRACING_TARGET;
use crate::config::StorageConfig;
use crate::error::{StorageError, StorageResult};

/// Unified storage backend that wraps OpenDAL operators.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = config.backend_name(),
            root = %config.root(),
            "Storage backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Downloads the object `remote` into the local file `local`, replacing
    /// the file if it exists. Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the object does not exist and
    /// [`StorageError::LocalWrite`] if the local file cannot be written.
    pub async fn fetch(&self, remote: &str, local: &Path) -> StorageResult<u64> {
        let started = Instant::now();
        tracing::debug!(
            target: TRACING_TARGET,
            remote = %remote,
            local = %local.display(),
            "Fetching object"
        );

        let data = self.read(remote).await?;

        if let Some(parent) = local.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::local_write(parent, e))?;
        }
        tokio::fs::write(local, &data)
            .await
            .map_err(|e| StorageError::local_write(local, e))?;

        let size = data.len() as u64;
        tracing::info!(
            target: TRACING_TARGET,
            remote = %remote,
            local = %local.display(),
            size,
            elapsed_ms = started.elapsed().as_millis(),
            "Object fetched"
        );

        Ok(size)
    }

    /// Reads an object from storage.
    pub async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let data = self.operator.read(path).await?.to_vec();

        tracing::trace!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "Object read complete"
        );

        Ok(data)
    }

    /// Writes an object to storage.
    pub async fn write(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "Writing object"
        );

        self.operator.write(path, data.to_vec()).await?;

        Ok(())
    }

    /// Creates an OpenDAL operator based on configuration.
    #[allow(unreachable_patterns)]
    fn create_operator(config: &StorageConfig) -> StorageResult<Operator> {
        match config {
            StorageConfig::Memory => Operator::new(services::Memory::default())
                .map(|op| op.finish())
                .map_err(|e| StorageError::init(e.to_string())),

            #[cfg(feature = "fs")]
            StorageConfig::Fs(fs) => Operator::new(services::Fs::default().root(&fs.root))
                .map(|op| op.finish())
                .map_err(|e| StorageError::init(e.to_string())),

            #[cfg(feature = "s3")]
            StorageConfig::S3(s3) => {
                let mut builder = services::S3::default()
                    .bucket(&s3.bucket)
                    .region(&s3.region);

                if let Some(ref endpoint) = s3.endpoint {
                    builder = builder.endpoint(endpoint);
                }

                if let Some(ref access_key_id) = s3.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }

                if let Some(ref secret_access_key) = s3.secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            // Reached when the config names a backend whose feature is off.
            _ => Err(StorageError::init(format!(
                "backend '{}' is not supported with current features",
                config.backend_name()
            ))),
        }
    }
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("backend", &self.config.backend_name())
            .field("root", &self.config.root())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_writes_local_file() {
        let backend = StorageBackend::new(StorageConfig::Memory).unwrap();
        backend
            .write("rhino-full/output_1.mp4", b"segment-one")
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("nested").join("segment_1.mp4");
        let size = backend
            .fetch("rhino-full/output_1.mp4", &local)
            .await
            .unwrap();

        assert_eq!(size, 11);
        assert_eq!(tokio::fs::read(&local).await.unwrap(), b"segment-one");
    }

    #[tokio::test]
    async fn test_fetch_overwrites_existing_file() {
        let backend = StorageBackend::new(StorageConfig::Memory).unwrap();
        backend.write("a.mp4", b"new").await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("a.mp4");
        tokio::fs::write(&local, b"old and longer").await.unwrap();

        backend.fetch("a.mp4", &local).await.unwrap();
        assert_eq!(tokio::fs::read(&local).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_fetch_missing_object() {
        let backend = StorageBackend::new(StorageConfig::Memory).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = backend
            .fetch("absent.mp4", &dir.path().join("absent.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(!err.is_retryable());
        assert!(!dir.path().join("absent.mp4").exists());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let backend = StorageBackend::new(StorageConfig::Memory).unwrap();
        backend.write("rhino-manifest.txt", b"{}").await.unwrap();
        assert_eq!(backend.read("rhino-manifest.txt").await.unwrap(), b"{}");
    }
}
