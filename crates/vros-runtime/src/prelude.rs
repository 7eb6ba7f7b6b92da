//! Convenient re-exports for driving a session.

pub use crate::{
    ArtifactFetcher, Playback, PlaybackRequest, Session, SessionConfig, SessionContext,
    SessionError, SessionMode, SessionReport,
};
