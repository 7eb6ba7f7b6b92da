#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for manifest construction and (de)serialization.
pub const TRACING_TARGET_MANIFEST: &str = "vros_core::manifest";

/// Tracing target for viewport trace loading.
pub const TRACING_TARGET_TRACE: &str = "vros_core::trace";

mod error;
mod naming;

pub mod fov;
pub mod manifest;
pub mod trace;

#[doc(hidden)]
pub mod prelude;

pub use error::{Error, Result};
pub use fov::{FovSize, FrameIndex, PathId, SegmentId, Viewport, overlap_ratio};
pub use manifest::{Manifest, PredictedPath, SegmentMetadata};
pub use naming::{SegmentNaming, segment_id_from_name};
pub use trace::ViewportTrace;
