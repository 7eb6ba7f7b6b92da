#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for per-segment protocol state transitions.
pub const TRACING_TARGET_SESSION: &str = "vros_runtime::session";

/// Tracing target for frame-by-frame FOV verification.
pub const TRACING_TARGET_VERIFY: &str = "vros_runtime::verify";

/// Tracing target for artifact downloads.
pub const TRACING_TARGET_FETCH: &str = "vros_runtime::fetch";

/// Tracing target for playback requests.
pub const TRACING_TARGET_PLAYBACK: &str = "vros_runtime::playback";

mod config;
mod error;
mod fetch;
mod playback;
mod retry;
mod session;

#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;

#[doc(hidden)]
pub mod prelude;

pub use config::{SessionConfig, SessionMode};
pub use error::{Result, SessionError};
pub use fetch::{ArtifactFetcher, fetch_manifest};
pub use playback::{Playback, PlaybackRequest, TracingPlayback};
pub use retry::RetryConfig;
pub use session::{
    Session, SessionContext, SessionReport, SegmentOutcome, SegmentState, Verification, verify,
};
