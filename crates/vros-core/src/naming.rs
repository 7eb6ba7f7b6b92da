//! Remote and local segment file names.

use std::path::{Path, PathBuf};

use crate::fov::{PathId, SegmentId};

/// Resolves where full and FOV segments of one video live, remotely and on
/// local disk.
///
/// ```text
/// remote full:  <video>-full/output_<segment>.mp4
/// remote fov:   <video>-fov/<segment>/<path>.mp4
/// local full:   <segment_dir>/segment_<segment>.mp4
/// local fov:    <segment_dir>/segment_<segment>_<path>.mp4
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentNaming {
    video: String,
    segment_dir: PathBuf,
}

impl SegmentNaming {
    /// Creates the naming scheme for `video`, storing local copies under
    /// `segment_dir`.
    pub fn new(video: impl Into<String>, segment_dir: impl Into<PathBuf>) -> Self {
        Self {
            video: video.into(),
            segment_dir: segment_dir.into(),
        }
    }

    /// Returns the video name.
    pub fn video(&self) -> &str {
        &self.video
    }

    /// Returns the local segment directory.
    pub fn segment_dir(&self) -> &Path {
        &self.segment_dir
    }

    /// Remote name of the manifest document.
    pub fn remote_manifest(&self) -> String {
        format!("{}-manifest.txt", self.video)
    }

    /// Local path the manifest document is downloaded to.
    pub fn local_manifest(&self) -> PathBuf {
        self.segment_dir.join(self.remote_manifest())
    }

    /// Name of the ground-truth viewport trace file.
    pub fn trace_file(&self) -> String {
        format!("{}-trace.txt", self.video)
    }

    /// Remote name of a full-size segment.
    pub fn remote_full(&self, segment_id: SegmentId) -> String {
        format!("{}-full/output_{}.mp4", self.video, segment_id)
    }

    /// Remote name of a FOV segment cropped along `path_id`.
    pub fn remote_fov(&self, segment_id: SegmentId, path_id: PathId) -> String {
        format!("{}-fov/{}/{}.mp4", self.video, segment_id, path_id)
    }

    /// Local path of a downloaded full-size segment.
    pub fn local_full(&self, segment_id: SegmentId) -> PathBuf {
        self.segment_dir.join(format!("segment_{segment_id}.mp4"))
    }

    /// Local path of a downloaded FOV segment.
    pub fn local_fov(&self, segment_id: SegmentId, path_id: PathId) -> PathBuf {
        self.segment_dir
            .join(format!("segment_{segment_id}_{path_id}.mp4"))
    }
}

/// Extracts the segment id from a full-size segment file name such as
/// `output_12.mp4`: the last run of ASCII digits in the file stem.
pub fn segment_id_from_name(name: &str) -> Option<SegmentId> {
    let stem = Path::new(name).file_stem()?.to_str()?;
    let end = stem.rfind(|c: char| c.is_ascii_digit())? + 1;
    let start = stem[..end]
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);

    stem[start..end].parse::<u32>().ok().map(SegmentId::new)
}
