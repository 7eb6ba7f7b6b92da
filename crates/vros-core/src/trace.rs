//! Ground-truth viewport traces.
//!
//! A trace records where the viewer actually looked, one [`Viewport`] per
//! frame, densely indexed from frame 0. The session only reads it.
//!
//! # File format
//!
//! One sample per line, whitespace separated:
//!
//! ```text
//! frameIndex x y width height
//! frameIndex x y              # size taken from FovSize
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use std::path::Path;

use crate::fov::{FovSize, FrameIndex, Viewport};
use crate::{Error, Result, TRACING_TARGET_TRACE};

/// Dense, read-only sequence of observed viewports indexed by frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportTrace {
    samples: Vec<Viewport>,
}

impl ViewportTrace {
    /// Creates a trace from samples that must be ordered by frame, starting
    /// at frame 0, without gaps.
    pub fn from_samples(samples: Vec<Viewport>) -> Result<Self> {
        for (position, sample) in samples.iter().enumerate() {
            if sample.frame_index() as usize != position {
                return Err(Error::invalid_trace_line(
                    position + 1,
                    format!(
                        "expected frame {position}, found frame {}",
                        sample.frame_index()
                    ),
                ));
            }
        }

        Ok(Self { samples })
    }

    /// Parses a trace document.
    pub fn parse(content: &str, fov_size: FovSize) -> Result<Self> {
        let mut samples = Vec::new();

        for (number, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            samples.push(parse_sample(number + 1, line, fov_size)?);
        }

        Self::from_samples(samples)
    }

    /// Reads and parses a trace file.
    pub async fn load(path: impl AsRef<Path>, fov_size: FovSize) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let trace = Self::parse(&content, fov_size)?;

        tracing::debug!(
            target: TRACING_TARGET_TRACE,
            path = %path.display(),
            frames = trace.len(),
            "Viewport trace loaded"
        );

        Ok(trace)
    }

    /// Returns the sample at `frame`, if any.
    #[inline]
    pub fn get(&self, frame: FrameIndex) -> Option<&Viewport> {
        self.samples.get(frame as usize)
    }

    /// Returns the sample at `frame`, failing if the trace is too short.
    pub fn viewport(&self, frame: FrameIndex) -> Result<&Viewport> {
        self.get(frame).ok_or(Error::MissingViewport { frame })
    }

    /// Returns the number of frames covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn parse_sample(number: usize, line: &str, fov_size: FovSize) -> Result<Viewport> {
    let columns: Vec<&str> = line.split_whitespace().collect();

    let frame = columns[0]
        .parse::<FrameIndex>()
        .map_err(|e| Error::invalid_trace_line(number, format!("frame index: {e}")))?;
    let number_at = |i: usize| -> Result<f64> {
        columns[i]
            .parse::<f64>()
            .map_err(|e| Error::invalid_trace_line(number, format!("column {}: {e}", i + 1)))
    };

    let (x, y, width, height) = match columns.len() {
        5 => (number_at(1)?, number_at(2)?, number_at(3)?, number_at(4)?),
        3 => (number_at(1)?, number_at(2)?, fov_size.width, fov_size.height),
        n => {
            return Err(Error::invalid_trace_line(
                number,
                format!("expected 3 or 5 columns, found {n}"),
            ));
        }
    };

    Viewport::new(frame, x, y, width, height)
        .map_err(|e| Error::invalid_trace_line(number, e.to_string()))
}
