//! Segment manifest.
//!
//! A [`Manifest`] is a flat table of segments indexed by [`SegmentId`], each
//! holding a flat table of [`PredictedPath`]s indexed by [`PathId`]. Index 0
//! is a reserved placeholder so that segment ids can index the table
//! directly; it carries no data and never takes part in comparisons.
//!
//! # Document format
//!
//! ```json
//! {
//!   "length": 2,
//!   "segments": [
//!     { "size": -1, "paths": [] },
//!     { "size": 18234, "paths": [
//!       { "pathId": 0, "rectangles": [
//!         { "frameIndex": 0, "x": 10.0, "y": 20.0, "width": 1280.0, "height": 720.0 }
//!       ] }
//!     ] }
//!   ]
//! }
//! ```
//!
//! `length` counts every record including the placeholder, and a size of `-1`
//! marks a segment whose byte size is unknown.

mod builder;
mod prediction;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::fov::{FrameIndex, PathId, SegmentId, Viewport};
use crate::{Error, Result, TRACING_TARGET_MANIFEST};

/// One candidate FOV crop for a segment: a rectangle per predicted frame,
/// ordered by frame index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PathRecord")]
pub struct PredictedPath {
    path_id: PathId,
    rectangles: Vec<Viewport>,
}

/// Path as it appears in a document, rectangles in any order.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathRecord {
    path_id: PathId,
    rectangles: Vec<Viewport>,
}

impl From<PathRecord> for PredictedPath {
    fn from(record: PathRecord) -> Self {
        Self::new(record.path_id, record.rectangles)
    }
}

impl PredictedPath {
    /// Creates a path, ordering its rectangles by frame index.
    pub fn new(path_id: PathId, mut rectangles: Vec<Viewport>) -> Self {
        rectangles.sort_by_key(Viewport::frame_index);
        Self {
            path_id,
            rectangles,
        }
    }

    #[inline]
    pub fn path_id(&self) -> PathId {
        self.path_id
    }

    #[inline]
    pub fn rectangles(&self) -> &[Viewport] {
        &self.rectangles
    }

    /// Returns the predicted rectangle in effect at `frame`.
    ///
    /// That is the rectangle with the greatest frame index not after `frame`,
    /// or the first rectangle when every entry is later. A path holding a
    /// single key-frame rectangle therefore covers the whole segment.
    pub fn rectangle_for(&self, frame: FrameIndex) -> Option<&Viewport> {
        let position = self
            .rectangles
            .partition_point(|r| r.frame_index() <= frame);
        match position {
            0 => self.rectangles.first(),
            n => self.rectangles.get(n - 1),
        }
    }
}

/// Size and predicted paths of one segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    #[serde(rename = "size", with = "size_sentinel")]
    byte_size: Option<u64>,
    #[serde(default)]
    paths: Vec<PredictedPath>,
}

impl SegmentMetadata {
    /// Creates segment metadata, ordering paths by id.
    pub fn new(byte_size: Option<u64>, mut paths: Vec<PredictedPath>) -> Self {
        paths.sort_by_key(PredictedPath::path_id);
        Self { byte_size, paths }
    }

    /// Byte size of the full-size segment, if measured.
    #[inline]
    pub fn byte_size(&self) -> Option<u64> {
        self.byte_size
    }

    /// Predicted paths ordered by id. Empty when no FOV prediction exists.
    #[inline]
    pub fn paths(&self) -> &[PredictedPath] {
        &self.paths
    }

    /// Looks up a predicted path by id.
    pub fn path(&self, path_id: PathId) -> Option<&PredictedPath> {
        self.paths
            .binary_search_by_key(&path_id, PredictedPath::path_id)
            .ok()
            .map(|i| &self.paths[i])
    }
}

/// Per-session table of segment sizes and predicted paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "ManifestDocument", try_from = "ManifestDocument")]
pub struct Manifest {
    /// Index 0 is the placeholder; index `i` is segment `i`.
    segments: Vec<SegmentMetadata>,
}

impl Manifest {
    /// Creates a manifest from real segments, the first becoming segment 1.
    pub fn new(segments: impl IntoIterator<Item = SegmentMetadata>) -> Self {
        let mut table = vec![SegmentMetadata::placeholder()];
        table.extend(segments);
        Self { segments: table }
    }

    /// Number of real segments.
    #[inline]
    pub fn segment_count(&self) -> u32 {
        (self.segments.len() - 1) as u32
    }

    /// Returns the metadata of `segment_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] outside `[1, segment_count]`.
    pub fn segment(&self, segment_id: SegmentId) -> Result<&SegmentMetadata> {
        let segment = match segment_id.get() as usize {
            0 => None,
            i => self.segments.get(i),
        };
        segment.ok_or(Error::OutOfRange {
            segment_id,
            segment_count: self.segment_count(),
        })
    }

    /// Byte size of `segment_id`, `None` when unknown.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] outside `[1, segment_count]`.
    pub fn segment_byte_size(&self, segment_id: SegmentId) -> Result<Option<u64>> {
        self.segment(segment_id).map(SegmentMetadata::byte_size)
    }

    /// Looks up a predicted path of a segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] for an unknown segment and
    /// [`Error::UnknownPath`] if the segment has no such path.
    pub fn predicted_path(&self, segment_id: SegmentId, path_id: PathId) -> Result<&PredictedPath> {
        self.segment(segment_id)?
            .path(path_id)
            .ok_or(Error::UnknownPath {
                segment_id,
                path_id,
            })
    }

    /// Iterates real segments in id order.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentId, &SegmentMetadata)> {
        self.segments
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, segment)| (SegmentId::new(i as u32), segment))
    }

    /// Returns true if any segment carries a predicted path.
    pub fn has_predictions(&self) -> bool {
        self.segments().any(|(_, segment)| !segment.paths.is_empty())
    }

    /// Serializes to a pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses a JSON document.
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reads a manifest document from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let manifest = Self::from_json(&content)?;

        tracing::debug!(
            target: TRACING_TARGET_MANIFEST,
            path = %path.display(),
            segments = manifest.segment_count(),
            "Manifest loaded"
        );

        Ok(manifest)
    }

    /// Writes the manifest document to disk, replacing any existing file.
    pub async fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        tokio::fs::write(path, self.to_json()?).await?;

        tracing::info!(
            target: TRACING_TARGET_MANIFEST,
            path = %path.display(),
            segments = self.segment_count(),
            "Manifest written"
        );

        Ok(())
    }
}

impl PartialEq for Manifest {
    fn eq(&self, other: &Self) -> bool {
        self.segments[1..] == other.segments[1..]
    }
}

impl SegmentMetadata {
    fn placeholder() -> Self {
        Self {
            byte_size: None,
            paths: Vec::new(),
        }
    }
}

/// Serialized form of a [`Manifest`].
#[derive(Serialize, Deserialize)]
struct ManifestDocument {
    length: usize,
    segments: Vec<SegmentMetadata>,
}

impl From<Manifest> for ManifestDocument {
    fn from(manifest: Manifest) -> Self {
        Self {
            length: manifest.segments.len(),
            segments: manifest.segments,
        }
    }
}

impl TryFrom<ManifestDocument> for Manifest {
    type Error = Error;

    fn try_from(document: ManifestDocument) -> Result<Self> {
        if document.segments.is_empty() {
            return Err(Error::invalid_manifest("missing placeholder record"));
        }
        if document.length != document.segments.len() {
            return Err(Error::invalid_manifest(format!(
                "length is {} but {} records are present",
                document.length,
                document.segments.len()
            )));
        }

        let mut segments = document.segments.into_iter();
        segments.next();

        let mut real = Vec::with_capacity(segments.len());
        for (i, segment) in segments.enumerate() {
            let segment = SegmentMetadata::new(segment.byte_size, segment.paths);
            if let Some(pair) = segment
                .paths
                .windows(2)
                .find(|pair| pair[0].path_id == pair[1].path_id)
            {
                return Err(Error::invalid_manifest(format!(
                    "segment {} lists path {} twice",
                    i + 1,
                    pair[0].path_id
                )));
            }
            real.push(segment);
        }

        Ok(Self::new(real))
    }
}

/// Maps an unknown byte size to the `-1` sentinel of the document format.
mod size_sentinel {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(size) => serializer.serialize_u64(*size),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        if raw < 0 {
            Ok(None)
        } else {
            Ok(Some(raw as u64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(frame: FrameIndex, x: f64) -> Viewport {
        Viewport::new(frame, x, 0.0, 100.0, 100.0).unwrap()
    }

    fn sample() -> Manifest {
        Manifest::new([
            SegmentMetadata::new(
                Some(1200),
                vec![
                    PredictedPath::new(PathId::new(1), vec![rect(0, 5.0)]),
                    PredictedPath::new(PathId::new(0), vec![rect(1, 1.0), rect(0, 0.0)]),
                ],
            ),
            SegmentMetadata::new(Some(900), Vec::new()),
            SegmentMetadata::new(None, Vec::new()),
        ])
    }

    #[test]
    fn test_queries() {
        let manifest = sample();
        assert_eq!(manifest.segment_count(), 3);
        assert_eq!(manifest.segment_byte_size(SegmentId::new(1)).unwrap(), Some(1200));
        assert_eq!(manifest.segment_byte_size(SegmentId::new(3)).unwrap(), None);
        assert!(manifest.has_predictions());

        let ids: Vec<_> = manifest.segments().map(|(id, _)| id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_byte_size_out_of_range() {
        let manifest = sample();
        for id in [0, 4, 100] {
            assert!(matches!(
                manifest.segment_byte_size(SegmentId::new(id)),
                Err(Error::OutOfRange { segment_count: 3, .. })
            ));
        }
    }

    #[test]
    fn test_unknown_path() {
        let manifest = sample();
        assert!(manifest.predicted_path(SegmentId::new(1), PathId::new(1)).is_ok());
        assert!(matches!(
            manifest.predicted_path(SegmentId::new(2), PathId::new(0)),
            Err(Error::UnknownPath { .. })
        ));
    }

    #[test]
    fn test_rectangle_for_frame() {
        let path = PredictedPath::new(
            PathId::new(0),
            vec![rect(30, 3.0), rect(32, 5.0), rect(31, 4.0)],
        );
        assert_eq!(path.rectangle_for(29).unwrap().x(), 3.0);
        assert_eq!(path.rectangle_for(30).unwrap().x(), 3.0);
        assert_eq!(path.rectangle_for(31).unwrap().x(), 4.0);
        assert_eq!(path.rectangle_for(44).unwrap().x(), 5.0);

        let single = PredictedPath::new(PathId::new(2), vec![rect(15, 9.0)]);
        assert_eq!(single.rectangle_for(20).unwrap().x(), 9.0);
    }

    #[test]
    fn test_document_round_trip() {
        let manifest = sample();
        let json = manifest.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["length"], 4);
        assert_eq!(value["segments"][0]["size"], -1);
        assert_eq!(value["segments"][1]["paths"][0]["pathId"], 0);
        assert_eq!(
            value["segments"][1]["paths"][0]["rectangles"][1]["frameIndex"],
            1
        );

        assert_eq!(Manifest::from_json(&json).unwrap(), manifest);
    }

    #[test]
    fn test_loaded_rectangles_are_ordered_by_frame() {
        let json = r#"{"length":2,"segments":[
            {"size":-1,"paths":[]},
            {"size":5,"paths":[{"pathId":0,"rectangles":[
                {"frameIndex":2,"x":200.0,"y":0.0,"width":100.0,"height":100.0},
                {"frameIndex":0,"x":0.0,"y":0.0,"width":100.0,"height":100.0},
                {"frameIndex":1,"x":100.0,"y":0.0,"width":100.0,"height":100.0}
            ]}]}
        ]}"#;
        let manifest = Manifest::from_json(json).unwrap();
        let path = manifest
            .predicted_path(SegmentId::new(1), PathId::new(0))
            .unwrap();

        let frames: Vec<_> = path.rectangles().iter().map(Viewport::frame_index).collect();
        assert_eq!(frames, vec![0, 1, 2]);
        assert_eq!(path.rectangle_for(2).unwrap().x(), 200.0);
        assert_eq!(path.rectangle_for(1).unwrap().x(), 100.0);

        let expected = Manifest::new([SegmentMetadata::new(
            Some(5),
            vec![PredictedPath::new(
                PathId::new(0),
                vec![rect(2, 200.0), rect(0, 0.0), rect(1, 100.0)],
            )],
        )]);
        assert_eq!(manifest, expected);
    }

    #[test]
    fn test_placeholder_excluded_from_equality() {
        let json = r#"{"length":2,"segments":[{"size":77,"paths":[]},{"size":5,"paths":[]}]}"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(manifest, Manifest::new([SegmentMetadata::new(Some(5), Vec::new())]));
    }

    #[test]
    fn test_inconsistent_length_rejected() {
        let json = r#"{"length":3,"segments":[{"size":-1,"paths":[]},{"size":5,"paths":[]}]}"#;
        assert!(matches!(
            Manifest::from_json(json),
            Err(Error::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_write_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video-manifest.txt");

        let manifest = sample();
        manifest.write(&path).await.unwrap();
        assert_eq!(Manifest::load(&path).await.unwrap(), manifest);
    }
}
