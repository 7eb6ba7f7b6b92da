//! Session configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Result, RetryConfig, SessionError};

/// How segments are fetched.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SessionMode {
    /// Always fetch the full segment without contacting the server.
    #[cfg_attr(feature = "config", value(name = "BASELINE", alias = "baseline"))]
    Baseline,
    /// Negotiate each segment with the server and verify FOV crops.
    #[default]
    #[cfg_attr(feature = "config", value(name = "SVR", alias = "svr"))]
    Svr,
}

/// Tuning of the fetch decision protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct SessionConfig {
    /// Fetch mode.
    #[cfg_attr(feature = "config", arg(value_enum, value_name = "MODE", env = "VROS_MODE"))]
    #[serde(default)]
    pub mode: SessionMode,

    /// Minimum fraction of the actual viewport a predicted rectangle must
    /// cover for a frame to pass verification.
    #[cfg_attr(
        feature = "config",
        arg(long = "threshold", env = "VROS_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)
    )]
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Number of frames in every segment.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "frames-per-segment",
            env = "VROS_FRAMES_PER_SEGMENT",
            default_value_t = DEFAULT_FRAMES_PER_SEGMENT
        )
    )]
    #[serde(default = "default_frames_per_segment")]
    pub frames_per_segment: u32,

    /// Extra attempts for a failed segment download (0 disables retries).
    #[cfg_attr(
        feature = "config",
        arg(long = "fetch-retries", env = "VROS_FETCH_RETRIES", default_value_t = 0)
    )]
    #[serde(default)]
    pub fetch_retries: u32,

    /// Initial backoff between download attempts in milliseconds.
    #[cfg_attr(
        feature = "config",
        arg(
            long = "fetch-backoff-ms",
            env = "VROS_FETCH_BACKOFF_MS",
            default_value_t = DEFAULT_FETCH_BACKOFF_MS
        )
    )]
    #[serde(default = "default_fetch_backoff_ms")]
    pub fetch_backoff_ms: u64,
}

const DEFAULT_THRESHOLD: f64 = 0.8;
const DEFAULT_FRAMES_PER_SEGMENT: u32 = 15;
const DEFAULT_FETCH_BACKOFF_MS: u64 = 100;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_frames_per_segment() -> u32 {
    DEFAULT_FRAMES_PER_SEGMENT
}

fn default_fetch_backoff_ms() -> u64 {
    DEFAULT_FETCH_BACKOFF_MS
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(SessionMode::default())
    }
}

impl SessionConfig {
    /// Creates a configuration for `mode` with default tuning.
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            threshold: DEFAULT_THRESHOLD,
            frames_per_segment: DEFAULT_FRAMES_PER_SEGMENT,
            fetch_retries: 0,
            fetch_backoff_ms: DEFAULT_FETCH_BACKOFF_MS,
        }
    }

    /// Sets the verification threshold.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the number of frames per segment.
    #[must_use]
    pub fn with_frames_per_segment(mut self, frames_per_segment: u32) -> Self {
        self.frames_per_segment = frames_per_segment;
        self
    }

    /// Sets the download retry policy.
    #[must_use]
    pub fn with_fetch_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.fetch_retries = retries;
        self.fetch_backoff_ms = backoff.as_millis() as u64;
        self
    }

    /// Returns the retry policy for segment downloads.
    pub fn retry(&self) -> RetryConfig {
        if self.fetch_retries == 0 {
            return RetryConfig::no_retry();
        }
        RetryConfig::new(
            self.fetch_retries,
            Duration::from_millis(self.fetch_backoff_ms),
        )
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            return Err(SessionError::invalid_config(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        if self.frames_per_segment == 0 {
            return Err(SessionError::invalid_config(
                "frames per segment must be positive",
            ));
        }
        Ok(())
    }
}
