//! Playback hand-off.

use std::fmt;
use std::path::PathBuf;

use crate::TRACING_TARGET_PLAYBACK;

/// Request to play a local segment file over a frame range.
///
/// Frame numbers are relative to the start of the segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    /// Local segment file.
    pub file: PathBuf,
    /// First frame to play.
    pub start_frame: u32,
    /// Last frame to play (inclusive); `None` plays to the end.
    pub end_frame: Option<u32>,
}

impl PlaybackRequest {
    /// Plays `file` from `start_frame` to its end.
    pub fn to_end(file: impl Into<PathBuf>, start_frame: u32) -> Self {
        Self {
            file: file.into(),
            start_frame,
            end_frame: None,
        }
    }

    /// Plays `file` over `start_frame..=end_frame`.
    pub fn range(file: impl Into<PathBuf>, start_frame: u32, end_frame: u32) -> Self {
        Self {
            file: file.into(),
            start_frame,
            end_frame: Some(end_frame),
        }
    }

    /// Returns the number of frames played from a segment of
    /// `frames_per_segment` frames.
    pub fn frame_count(&self, frames_per_segment: u32) -> u32 {
        let end = self
            .end_frame
            .map_or(frames_per_segment, |end| (end + 1).min(frames_per_segment));
        end.saturating_sub(self.start_frame)
    }
}

impl fmt::Display for PlaybackRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end_frame {
            Some(end) => write!(f, "{} [{}..={end}]", self.file.display(), self.start_frame),
            None => write!(f, "{} [{}..]", self.file.display(), self.start_frame),
        }
    }
}

/// Fire-and-forget sink for playback requests.
///
/// The session never waits for playback; implementations must return
/// promptly and handle their own failures.
pub trait Playback: Send + Sync {
    /// Queues `request` for playback.
    fn play(&self, request: PlaybackRequest);
}

/// Playback sink that only logs requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPlayback;

impl Playback for TracingPlayback {
    fn play(&self, request: PlaybackRequest) {
        tracing::info!(
            target: TRACING_TARGET_PLAYBACK,
            file = %request.file.display(),
            start_frame = request.start_frame,
            end_frame = ?request.end_frame,
            "Playback requested"
        );
    }
}
