//! Session outcome reporting.

use serde::Serialize;
use vros_core::SegmentId;
use vros_transport::{Decision, Verdict};

/// What happened to one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentOutcome {
    /// Segment id.
    pub segment_id: SegmentId,
    /// Server decision; `None` in `BASELINE` mode.
    pub decision: Option<Decision>,
    /// Verdict reported to the server, if the FOV branch ran.
    pub verdict: Option<Verdict>,
    /// Frames played from the FOV crop, if the FOV branch ran.
    pub decoded_frames: Option<u32>,
    /// True when the full segment was fetched after a rejected crop.
    pub fallback: bool,
    /// Downloads that failed, as `remote: error`.
    pub fetch_failures: Vec<String>,
}

impl SegmentOutcome {
    pub(crate) fn new(segment_id: SegmentId) -> Self {
        Self {
            segment_id,
            decision: None,
            verdict: None,
            decoded_frames: None,
            fallback: false,
            fetch_failures: Vec::new(),
        }
    }

    /// Returns true when every download for this segment succeeded.
    pub fn is_complete(&self) -> bool {
        self.fetch_failures.is_empty()
    }
}

/// Per-segment outcomes of a finished session, in segment order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionReport {
    pub segments: Vec<SegmentOutcome>,
}

impl SessionReport {
    /// Number of segments whose FOV crop was accepted.
    pub fn accepted(&self) -> usize {
        self.count_verdicts(Verdict::Good)
    }

    /// Number of segments whose FOV crop was rejected.
    pub fn rejected(&self) -> usize {
        self.count_verdicts(Verdict::Bad)
    }

    /// Number of segments that needed a fallback download.
    pub fn fallbacks(&self) -> usize {
        self.segments.iter().filter(|s| s.fallback).count()
    }

    /// Number of failed downloads across the session.
    pub fn fetch_failures(&self) -> usize {
        self.segments.iter().map(|s| s.fetch_failures.len()).sum()
    }

    fn count_verdicts(&self, verdict: Verdict) -> usize {
        self.segments
            .iter()
            .filter(|s| s.verdict == Some(verdict))
            .count()
    }
}
