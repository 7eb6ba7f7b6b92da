//! Frame-by-frame verification of a FOV crop.

use vros_core::{FrameIndex, PredictedPath, Result, ViewportTrace, overlap_ratio};

use crate::TRACING_TARGET_VERIFY;

/// Result of verifying one segment's predicted path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verification {
    /// Frames, from the segment start, that passed before the first failure.
    pub decoded_frames: u32,
    /// Frames in the segment.
    pub frames: u32,
    /// Overlap of the first failing frame.
    pub failed_overlap: Option<f64>,
}

impl Verification {
    /// Returns true when every frame passed.
    pub fn passed(&self) -> bool {
        self.decoded_frames == self.frames
    }
}

/// Checks `frames` frames starting at `key_frame` against the viewer's trace.
///
/// A frame passes when the predicted rectangle covers at least `threshold`
/// of the actual viewport. Verification stops at the first failing frame.
///
/// # Errors
///
/// Returns [`vros_core::Error::MissingViewport`] when the trace has no sample
/// for a checked frame.
pub fn verify(
    path: &PredictedPath,
    trace: &ViewportTrace,
    key_frame: FrameIndex,
    frames: u32,
    threshold: f64,
) -> Result<Verification> {
    for offset in 0..frames {
        let frame = key_frame + offset;
        let actual = trace.viewport(frame)?;
        let Some(predicted) = path.rectangle_for(frame) else {
            tracing::debug!(
                target: TRACING_TARGET_VERIFY,
                frame,
                path_id = %path.path_id(),
                "Predicted path has no rectangles"
            );
            return Ok(Verification {
                decoded_frames: offset,
                frames,
                failed_overlap: Some(0.0),
            });
        };

        let overlap = overlap_ratio(predicted, actual);
        if overlap < threshold {
            tracing::debug!(
                target: TRACING_TARGET_VERIFY,
                frame,
                path_id = %path.path_id(),
                actual = %actual,
                predicted = %predicted,
                overlap,
                threshold,
                "Frame below overlap threshold"
            );
            return Ok(Verification {
                decoded_frames: offset,
                frames,
                failed_overlap: Some(overlap),
            });
        }

        tracing::trace!(target: TRACING_TARGET_VERIFY, frame, overlap, "Frame verified");
    }

    Ok(Verification {
        decoded_frames: frames,
        frames,
        failed_overlap: None,
    })
}

#[cfg(test)]
mod tests {
    use vros_core::{PathId, Viewport};

    use super::*;

    fn trace(frames: u32) -> ViewportTrace {
        let samples = (0..frames)
            .map(|f| Viewport::new(f, 100.0, 100.0, 100.0, 100.0).unwrap())
            .collect();
        ViewportTrace::from_samples(samples).unwrap()
    }

    #[test]
    fn test_exact_prediction_passes() {
        let trace = trace(30);
        let rectangles = (15..30).map(|f| *trace.get(f).unwrap()).collect();
        let path = PredictedPath::new(PathId::new(0), rectangles);

        let result = verify(&path, &trace, 15, 15, 1.0).unwrap();
        assert!(result.passed());
        assert_eq!(result.decoded_frames, 15);
        assert_eq!(result.failed_overlap, None);
    }

    #[test]
    fn test_stops_at_first_failing_frame() {
        let trace = trace(15);
        let rectangles = (0..15)
            .map(|f| {
                let viewport = *trace.get(f).unwrap();
                match f {
                    // Covers 30% of the actual viewport.
                    5 => viewport.translated(70.0, 0.0),
                    // Would pass, but verification never gets here.
                    _ => viewport,
                }
            })
            .collect();
        let path = PredictedPath::new(PathId::new(2), rectangles);

        let result = verify(&path, &trace, 0, 15, 0.6).unwrap();
        assert!(!result.passed());
        assert_eq!(result.decoded_frames, 5);
        let overlap = result.failed_overlap.unwrap();
        assert!((overlap - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let trace = trace(3);
        let half = Viewport::new(0, 150.0, 100.0, 100.0, 100.0).unwrap();
        let path = PredictedPath::new(PathId::new(0), vec![half]);

        assert!(verify(&path, &trace, 0, 3, 0.5).unwrap().passed());
        assert_eq!(verify(&path, &trace, 0, 3, 0.51).unwrap().decoded_frames, 0);
    }

    #[test]
    fn test_single_rectangle_covers_segment() {
        let trace = trace(30);
        let key = *trace.get(15).unwrap();
        let path = PredictedPath::new(PathId::new(1), vec![key]);

        assert!(verify(&path, &trace, 15, 15, 0.9).unwrap().passed());
    }

    #[test]
    fn test_empty_path_fails_first_frame() {
        let path = PredictedPath::new(PathId::new(0), Vec::new());
        let result = verify(&path, &trace(15), 0, 15, 0.0).unwrap();
        assert_eq!(result.decoded_frames, 0);
    }

    #[test]
    fn test_missing_trace_sample_is_error() {
        let trace = trace(10);
        let path = PredictedPath::new(PathId::new(0), vec![*trace.get(0).unwrap()]);

        let err = verify(&path, &trace, 0, 15, 0.5).unwrap_err();
        assert!(matches!(err, vros_core::Error::MissingViewport { frame: 10 }));
    }
}
