//! Prelude module for convenient imports.

pub use crate::error::{Error, Result};
pub use crate::fov::{FovSize, FrameIndex, PathId, SegmentId, Viewport, overlap_ratio};
pub use crate::manifest::{Manifest, PredictedPath, SegmentMetadata};
pub use crate::naming::SegmentNaming;
pub use crate::trace::ViewportTrace;
