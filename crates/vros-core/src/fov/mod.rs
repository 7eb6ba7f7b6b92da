//! Field-of-view geometry.
//!
//! Identifiers shared by manifests, traces and the wire protocol, plus the
//! [`Viewport`] rectangle and the [`overlap_ratio`] evaluator that gates the
//! accept/reject decision of a predicted FOV segment.

mod viewport;

#[cfg(feature = "config")]
use clap::Args;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
pub use viewport::{Viewport, overlap_ratio};

use crate::{Error, Result};

/// Absolute frame index within the video.
pub type FrameIndex = u32;

/// 1-based identifier of a video segment. Id 0 is reserved for the manifest
/// placeholder record and never names a real segment.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(From, Into, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(u32);

impl SegmentId {
    /// The first real segment.
    pub const FIRST: Self = Self(1);

    /// Creates a segment id from its raw value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the segment following this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the absolute index of the first frame of this segment.
    #[inline]
    pub const fn key_frame(self, frames_per_segment: u32) -> FrameIndex {
        self.0.saturating_sub(1) * frames_per_segment
    }
}

/// Identifier of a predicted path within a segment. Path 0 opens every
/// segment's group in the prediction file.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(From, Into, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathId(u32);

impl PathId {
    /// Creates a path id from its raw value.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Default width/height applied to prediction lines that carry only a
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct FovSize {
    /// Width of a predicted FOV crop, in pixels.
    #[cfg_attr(
        feature = "config",
        arg(long = "fov-width", env = "VROS_FOV_WIDTH", default_value_t = DEFAULT_FOV_WIDTH)
    )]
    pub width: f64,

    /// Height of a predicted FOV crop, in pixels.
    #[cfg_attr(
        feature = "config",
        arg(long = "fov-height", env = "VROS_FOV_HEIGHT", default_value_t = DEFAULT_FOV_HEIGHT)
    )]
    pub height: f64,
}

const DEFAULT_FOV_WIDTH: f64 = 1280.0;
const DEFAULT_FOV_HEIGHT: f64 = 720.0;

impl FovSize {
    /// Checks that both dimensions are positive and finite.
    pub fn validate(&self) -> Result<()> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(self.width) || !valid(self.height) {
            return Err(Error::invalid_viewport(format!(
                "FOV size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for FovSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_FOV_WIDTH,
            height: DEFAULT_FOV_HEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_frame() {
        assert_eq!(SegmentId::new(1).key_frame(15), 0);
        assert_eq!(SegmentId::new(2).key_frame(15), 15);
        assert_eq!(SegmentId::new(4).key_frame(30), 90);
    }

    #[test]
    fn test_fov_size_validate() {
        assert!(FovSize::default().validate().is_ok());
        for (width, height) in [(0.0, 720.0), (1280.0, -1.0), (f64::NAN, 720.0)] {
            assert!(matches!(
                FovSize { width, height }.validate(),
                Err(Error::InvalidViewport { .. })
            ));
        }
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&PathId::new(3)).unwrap();
        assert_eq!(json, "3");
        let id: SegmentId = serde_json::from_str("12").unwrap();
        assert_eq!(id.get(), 12);
        assert_eq!(id.next(), SegmentId::new(13));
    }
}
