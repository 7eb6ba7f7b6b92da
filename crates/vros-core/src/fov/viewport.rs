//! Viewport rectangles and overlap evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::FrameIndex;
use crate::{Error, Result};

/// Axis-aligned viewport rectangle observed or predicted for one frame.
///
/// `x`/`y` is the top-left corner. Width and height are always positive and
/// finite; a `Viewport` cannot be constructed otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ViewportRecord", rename_all = "camelCase")]
pub struct Viewport {
    frame_index: FrameIndex,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

/// Unvalidated wire/document form of a [`Viewport`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewportRecord {
    frame_index: FrameIndex,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl TryFrom<ViewportRecord> for Viewport {
    type Error = Error;

    fn try_from(record: ViewportRecord) -> Result<Self> {
        Self::new(
            record.frame_index,
            record.x,
            record.y,
            record.width,
            record.height,
        )
    }
}

impl Viewport {
    /// Creates a viewport, rejecting non-positive or non-finite geometry.
    pub fn new(frame_index: FrameIndex, x: f64, y: f64, width: f64, height: f64) -> Result<Self> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(Error::invalid_viewport(format!(
                "origin ({x}, {y}) is not finite"
            )));
        }
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(Error::invalid_viewport(format!(
                "size {width}x{height} must be positive"
            )));
        }

        Ok(Self {
            frame_index,
            x,
            y,
            width,
            height,
        })
    }

    /// Returns the absolute frame index this rectangle belongs to.
    #[inline]
    pub fn frame_index(&self) -> FrameIndex {
        self.frame_index
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the rectangle area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Returns a copy moved by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "frame {} [{}, {}, {}x{}]",
            self.frame_index, self.x, self.y, self.width, self.height
        )
    }
}

/// Fraction of `actual` covered by `predicted`, in `[0, 1]`.
///
/// The ratio is asymmetric: it is the intersection area divided by the area of
/// `actual` only. Disjoint rectangles yield `0.0`; `actual` fully inside
/// `predicted` yields `1.0`. Frame indices are ignored.
pub fn overlap_ratio(predicted: &Viewport, actual: &Viewport) -> f64 {
    let overlap_w = (predicted.x + predicted.width).min(actual.x + actual.width)
        - predicted.x.max(actual.x);
    let overlap_h = (predicted.y + predicted.height).min(actual.y + actual.height)
        - predicted.y.max(actual.y);

    if overlap_w <= 0.0 || overlap_h <= 0.0 {
        return 0.0;
    }

    (overlap_w * overlap_h / actual.area()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Viewport {
        Viewport::new(0, x, y, w, h).unwrap()
    }

    #[test]
    fn test_identical_rectangles_overlap_fully() {
        for r in [
            rect(0.0, 0.0, 1.0, 1.0),
            rect(100.0, 50.0, 1280.0, 720.0),
            rect(-20.0, -40.0, 3.5, 9.25),
        ] {
            assert_eq!(overlap_ratio(&r, &r), 1.0);
        }
    }

    #[test]
    fn test_disjoint_rectangles() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(overlap_ratio(&a, &rect(20.0, 0.0, 10.0, 10.0)), 0.0);
        assert_eq!(overlap_ratio(&a, &rect(0.0, 30.0, 10.0, 10.0)), 0.0);
        // Touching edges share no area.
        assert_eq!(overlap_ratio(&a, &rect(10.0, 0.0, 10.0, 10.0)), 0.0);
    }

    #[test]
    fn test_containment() {
        let predicted = rect(0.0, 0.0, 100.0, 100.0);
        let actual = rect(10.0, 10.0, 20.0, 20.0);
        assert_eq!(overlap_ratio(&predicted, &actual), 1.0);
        // Reversed, the small rectangle covers 4% of the large one.
        assert_eq!(overlap_ratio(&actual, &predicted), 0.04);
    }

    #[test]
    fn test_partial_overlap_is_relative_to_actual() {
        let predicted = rect(0.0, 0.0, 10.0, 10.0);
        let actual = rect(5.0, 0.0, 10.0, 10.0);
        assert_eq!(overlap_ratio(&predicted, &actual), 0.5);

        let actual = rect(5.0, 5.0, 10.0, 10.0);
        assert_eq!(overlap_ratio(&predicted, &actual), 0.25);
    }

    #[test]
    fn test_translation_invariance() {
        let predicted = rect(3.0, 4.0, 16.0, 9.0);
        let actual = rect(10.0, 6.0, 12.0, 12.0);
        let base = overlap_ratio(&predicted, &actual);

        for (dx, dy) in [(1.0, 1.0), (-64.0, 128.0), (1024.0, -2048.0)] {
            let moved = overlap_ratio(&predicted.translated(dx, dy), &actual.translated(dx, dy));
            assert_eq!(moved, base);
        }
    }

    #[test]
    fn test_rejects_degenerate_geometry() {
        assert!(Viewport::new(0, 0.0, 0.0, 0.0, 10.0).is_err());
        assert!(Viewport::new(0, 0.0, 0.0, 10.0, -1.0).is_err());
        assert!(Viewport::new(0, f64::NAN, 0.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Viewport = serde_json::from_str(
            r#"{"frameIndex":4,"x":1.0,"y":2.0,"width":3.0,"height":4.0}"#,
        )
        .unwrap();
        assert_eq!(ok.frame_index(), 4);

        let bad = serde_json::from_str::<Viewport>(
            r#"{"frameIndex":4,"x":1.0,"y":2.0,"width":0.0,"height":4.0}"#,
        );
        assert!(bad.is_err());
    }
}
