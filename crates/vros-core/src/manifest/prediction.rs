//! Prediction file parsing.
//!
//! Each line describes one predicted rectangle:
//!
//! ```text
//! segmentId pathId frameIndex x y width height
//! segmentId pathId frameIndex x y                 # size taken from FovSize
//! ```
//!
//! Path 0 opens the group of every segment; a line introducing a new segment
//! id with any other path id makes the file malformed.

use std::collections::BTreeMap;
use std::path::Path;

use super::PredictedPath;
use crate::fov::{FovSize, FrameIndex, PathId, SegmentId, Viewport};
use crate::{Error, Result, TRACING_TARGET_MANIFEST};

/// Predicted paths grouped by segment, each segment's paths ordered by id.
pub(crate) type PredictionTable = BTreeMap<SegmentId, Vec<PredictedPath>>;

/// Parses a prediction document.
pub(crate) fn parse_predictions(content: &str, fov_size: FovSize) -> Result<PredictionTable> {
    let mut groups: BTreeMap<SegmentId, BTreeMap<PathId, Vec<Viewport>>> = BTreeMap::new();
    let mut current: Option<SegmentId> = None;

    for (number, line) in content.lines().enumerate() {
        let number = number + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (segment_id, path_id, viewport) = parse_line(number, line, fov_size)?;
        if segment_id.get() == 0 {
            return Err(Error::invalid_trace_line(number, "segment id 0 is reserved"));
        }

        if current != Some(segment_id) {
            if path_id.get() != 0 {
                return Err(Error::invalid_trace_line(
                    number,
                    format!("segment {segment_id} must open with path 0, found path {path_id}"),
                ));
            }
            current = Some(segment_id);
        }

        groups
            .entry(segment_id)
            .or_default()
            .entry(path_id)
            .or_default()
            .push(viewport);
    }

    Ok(groups
        .into_iter()
        .map(|(segment_id, paths)| {
            let paths = paths
                .into_iter()
                .map(|(path_id, rectangles)| PredictedPath::new(path_id, rectangles))
                .collect();
            (segment_id, paths)
        })
        .collect())
}

/// Reads the prediction file, degrading to an empty table when the file is
/// missing or malformed.
pub(crate) async fn load_predictions(path: &Path, fov_size: FovSize) -> PredictionTable {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET_MANIFEST,
                path = %path.display(),
                error = %err,
                "Prediction file unavailable, manifest will only allow full-size fetches"
            );
            return PredictionTable::new();
        }
    };

    match parse_predictions(&content, fov_size) {
        Ok(table) => {
            tracing::debug!(
                target: TRACING_TARGET_MANIFEST,
                path = %path.display(),
                segments = table.len(),
                "Prediction file parsed"
            );
            table
        }
        Err(err) => {
            tracing::warn!(
                target: TRACING_TARGET_MANIFEST,
                path = %path.display(),
                error = %err,
                "Prediction file malformed, manifest will only allow full-size fetches"
            );
            PredictionTable::new()
        }
    }
}

fn parse_line(number: usize, line: &str, fov_size: FovSize) -> Result<(SegmentId, PathId, Viewport)> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() != 7 && columns.len() != 5 {
        return Err(Error::invalid_trace_line(
            number,
            format!("expected 5 or 7 columns, found {}", columns.len()),
        ));
    }

    let integer = |i: usize| -> Result<u32> {
        columns[i]
            .parse::<u32>()
            .map_err(|e| Error::invalid_trace_line(number, format!("column {}: {e}", i + 1)))
    };
    let real = |i: usize| -> Result<f64> {
        columns[i]
            .parse::<f64>()
            .map_err(|e| Error::invalid_trace_line(number, format!("column {}: {e}", i + 1)))
    };

    let segment_id = SegmentId::new(integer(0)?);
    let path_id = PathId::new(integer(1)?);
    let frame: FrameIndex = integer(2)?;
    let (width, height) = if columns.len() == 7 {
        (real(5)?, real(6)?)
    } else {
        (fov_size.width, fov_size.height)
    };

    let viewport = Viewport::new(frame, real(3)?, real(4)?, width, height)
        .map_err(|e| Error::invalid_trace_line(number, e.to_string()))?;

    Ok((segment_id, path_id, viewport))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_by_segment_and_path() {
        let table = parse_predictions(
            "1 0 0 0 0 10 10\n\
             1 1 0 5 5 10 10\n\
             1 0 1 1 1 10 10\n\
             2 0 15 2 2 10 10\n",
            FovSize::default(),
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        let first = &table[&SegmentId::new(1)];
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].path_id(), PathId::new(0));
        assert_eq!(first[0].rectangles().len(), 2);
        assert_eq!(first[1].path_id(), PathId::new(1));
        assert_eq!(table[&SegmentId::new(2)][0].rectangles()[0].frame_index(), 15);
    }

    #[test]
    fn test_rectangles_sorted_by_frame() {
        let table = parse_predictions(
            "1 0 2 0 0 10 10\n1 0 0 0 0 10 10\n1 0 1 0 0 10 10\n",
            FovSize::default(),
        )
        .unwrap();
        let frames: Vec<_> = table[&SegmentId::new(1)][0]
            .rectangles()
            .iter()
            .map(|r| r.frame_index())
            .collect();
        assert_eq!(frames, vec![0, 1, 2]);
    }

    #[test]
    fn test_short_lines_use_fov_size() {
        let size = FovSize {
            width: 640.0,
            height: 480.0,
        };
        let table = parse_predictions("1 0 0 10 20\n", size).unwrap();
        let rect = table[&SegmentId::new(1)][0].rectangles()[0];
        assert_eq!(rect.width(), 640.0);
        assert_eq!(rect.height(), 480.0);
    }

    #[test]
    fn test_segment_must_open_with_path_zero() {
        let err = parse_predictions("1 0 0 0 0 1 1\n2 3 15 0 0 1 1\n", FovSize::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidTraceLine { line: 2, .. }));
    }

    #[test]
    fn test_malformed_number() {
        assert!(parse_predictions("1 0 zero 0 0 1 1\n", FovSize::default()).is_err());
    }

    #[tokio::test]
    async fn test_missing_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let table = load_predictions(&dir.path().join("absent.txt"), FovSize::default()).await;
        assert!(table.is_empty());
    }
}
