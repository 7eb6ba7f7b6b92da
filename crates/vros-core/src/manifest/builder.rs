//! Manifest construction from a segment directory and a prediction file.

use std::io::ErrorKind;
use std::path::Path;

use super::prediction::load_predictions;
use super::{Manifest, SegmentMetadata};
use crate::fov::{FovSize, SegmentId};
use crate::naming::segment_id_from_name;
use crate::{Error, Result, TRACING_TARGET_MANIFEST};

impl Manifest {
    /// Builds a manifest from the full-size segments in `storage_dir` and the
    /// predicted paths in `prediction_file`.
    ///
    /// Segment files are ordered by the id embedded in their names; the `i`-th
    /// file becomes segment `i`. A missing or malformed prediction file leaves
    /// every segment without predicted paths.
    ///
    /// # Errors
    ///
    /// Fails if `fov_size` is not positive, if `storage_dir` does not exist or
    /// is not a directory, or if it cannot be listed.
    pub async fn build(
        storage_dir: impl AsRef<Path>,
        prediction_file: impl AsRef<Path>,
        fov_size: FovSize,
    ) -> Result<Self> {
        fov_size.validate()?;
        let storage_dir = storage_dir.as_ref();

        let metadata = match tokio::fs::metadata(storage_dir).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::StorageDirMissing {
                    path: storage_dir.to_path_buf(),
                });
            }
            Err(err) => return Err(err.into()),
        };
        if !metadata.is_dir() {
            return Err(Error::NotADirectory {
                path: storage_dir.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(storage_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }

            let name = entry.file_name();
            let name = name.to_string_lossy();
            match segment_id_from_name(&name) {
                Some(id) => files.push((id, metadata.len())),
                None => tracing::warn!(
                    target: TRACING_TARGET_MANIFEST,
                    file = %name,
                    "Skipping file without a segment id"
                ),
            }
        }
        files.sort_by_key(|(id, _)| *id);

        let mut predictions = load_predictions(prediction_file.as_ref(), fov_size).await;

        let segments: Vec<SegmentMetadata> = files
            .iter()
            .zip(1u32..)
            .map(|((_, size), position)| {
                let paths = predictions
                    .remove(&SegmentId::new(position))
                    .unwrap_or_default();
                SegmentMetadata::new(Some(*size), paths)
            })
            .collect();

        if !predictions.is_empty() {
            tracing::warn!(
                target: TRACING_TARGET_MANIFEST,
                orphaned = predictions.len(),
                "Predictions reference segments missing from the segment directory"
            );
        }

        let manifest = Self::new(segments);
        tracing::info!(
            target: TRACING_TARGET_MANIFEST,
            storage_dir = %storage_dir.display(),
            segments = manifest.segment_count(),
            predicted = manifest.has_predictions(),
            "Manifest built"
        );

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fov::PathId;

    async fn segment_dir(sizes: &[(&str, usize)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, size) in sizes {
            tokio::fs::write(dir.path().join(name), vec![0u8; *size])
                .await
                .unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn test_build_orders_segments_by_id() {
        let dir = segment_dir(&[
            ("output_10.mp4", 30),
            ("output_2.mp4", 20),
            ("output_1.mp4", 10),
        ])
        .await;
        let predictions = dir.path().join("pred.txt");
        tokio::fs::write(&predictions, "1 0 0 0 0 4 4\n3 0 30 0 0 4 4\n3 1 30 2 2 4 4\n")
            .await
            .unwrap();

        let manifest = Manifest::build(dir.path(), &predictions, FovSize::default())
            .await
            .unwrap();

        assert_eq!(manifest.segment_count(), 3);
        assert_eq!(manifest.segment_byte_size(SegmentId::new(1)).unwrap(), Some(10));
        assert_eq!(manifest.segment_byte_size(SegmentId::new(2)).unwrap(), Some(20));
        assert_eq!(manifest.segment_byte_size(SegmentId::new(3)).unwrap(), Some(30));

        assert_eq!(manifest.segment(SegmentId::new(1)).unwrap().paths().len(), 1);
        assert!(manifest.segment(SegmentId::new(2)).unwrap().paths().is_empty());
        assert!(
            manifest
                .predicted_path(SegmentId::new(3), PathId::new(1))
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_build_ignores_files_without_ids() {
        let dir = segment_dir(&[("output_1.mp4", 5), ("notes.txt", 3)]).await;
        let manifest = Manifest::build(dir.path(), dir.path().join("none"), FovSize::default())
            .await
            .unwrap();
        assert_eq!(manifest.segment_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::build(dir.path().join("absent"), "pred.txt", FovSize::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StorageDirMissing { .. }));
    }

    #[tokio::test]
    async fn test_zero_fov_size_is_rejected() {
        let dir = segment_dir(&[("output_1.mp4", 1)]).await;
        let fov_size = FovSize {
            width: 0.0,
            height: 720.0,
        };
        let err = Manifest::build(dir.path(), "pred.txt", fov_size)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidViewport { .. }));
    }

    #[tokio::test]
    async fn test_file_instead_of_directory_is_fatal() {
        let dir = segment_dir(&[("output_1.mp4", 1)]).await;
        let err = Manifest::build(
            dir.path().join("output_1.mp4"),
            "pred.txt",
            FovSize::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::NotADirectory { .. }));
    }

    #[tokio::test]
    async fn test_malformed_predictions_degrade() {
        let dir = segment_dir(&[("output_1.mp4", 1), ("output_2.mp4", 2)]).await;
        let predictions = dir.path().join("pred.txt");
        tokio::fs::write(&predictions, "1 0 0 0 0 4 4\nnot a line\n")
            .await
            .unwrap();

        let manifest = Manifest::build(dir.path(), &predictions, FovSize::default())
            .await
            .unwrap();
        assert_eq!(manifest.segment_count(), 2);
        assert!(!manifest.has_predictions());
    }
}
