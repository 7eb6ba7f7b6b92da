//! Per-segment protocol states.

use strum::IntoStaticStr;
use vros_core::{PathId, Viewport};
use vros_transport::Decision;

/// Position of the driver within one segment's protocol sequence.
///
/// `BASELINE` sessions enter at [`FullFetch`](Self::FullFetch); negotiated
/// sessions enter at [`AwaitTrace`](Self::AwaitTrace). Every path ends in
/// [`Done`](Self::Done).
#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SegmentState {
    /// Looking up the key-frame viewport in the trace.
    AwaitTrace,
    /// Key-frame viewport sent, waiting for the server's decision.
    RequestSent { key_frame: Viewport },
    /// The server answered.
    DecisionReceived { decision: Decision },
    /// Downloading the full segment and playing all of it.
    FullFetch,
    /// Downloading the FOV crop of `path_id` and verifying it frame by frame.
    FovVerify { path_id: PathId },
    /// Every frame passed; `GOOD` is reported.
    Accepted,
    /// Verification stopped after `decoded_frames` frames; `BAD` is reported.
    Rejected { decoded_frames: u32 },
    /// Downloading the full segment to play the frames the crop could not.
    FallbackFetch { decoded_frames: u32 },
    /// The segment is finished.
    Done,
}

impl SegmentState {
    /// Returns the state name for logging.
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(SegmentState::AwaitTrace.name(), "AWAIT_TRACE");
        assert_eq!(
            SegmentState::FallbackFetch { decoded_frames: 3 }.name(),
            "FALLBACK_FETCH"
        );
    }
}
