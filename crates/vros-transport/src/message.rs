//! Protocol messages exchanged with the negotiation server.

use serde::{Deserialize, Serialize};
use strum::Display;
use vros_core::{PathId, Viewport};

/// Server decision for a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Serve the whole frame.
    Full,
    /// Serve the FOV crop along the given predicted path.
    Fov(PathId),
}

impl Decision {
    /// Returns the chosen path, if any.
    pub fn path_id(&self) -> Option<PathId> {
        match self {
            Self::Full => None,
            Self::Fov(path_id) => Some(*path_id),
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => f.write_str("FULL"),
            Self::Fov(path_id) => write!(f, "FOV({path_id})"),
        }
    }
}

/// Client verdict after verifying a FOV segment frame by frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Every frame of the segment was covered by the predicted path.
    Good,
    /// Verification stopped at an insufficiently covered frame.
    Bad,
}

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Key-frame viewport metadata requesting a path decision.
    KeyFrame { viewport: Viewport },
    /// Verification verdict for the segment just decided.
    Verdict { verdict: Verdict },
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Path decision for the requested key frame.
    Decision { decision: Decision },
    /// Acknowledges a verdict.
    Ack,
}
