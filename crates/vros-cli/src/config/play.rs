//! Streaming session configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use vros_core::FovSize;
use vros_runtime::SessionConfig;
use vros_transport::TransportConfig;

use super::StorageArgs;
use crate::TRACING_TARGET_CONFIG;

/// Arguments of the `play` command.
///
/// Positional order is `HOST PORT SEGMENT_DIR VIDEO MODE`.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct PlayArgs {
    /// Negotiation server address and timeouts.
    #[command(flatten)]
    pub transport: TransportConfig,

    /// Local directory downloaded segments are written to; created if missing.
    #[arg(value_name = "SEGMENT_DIR", env = "VROS_SEGMENT_DIR")]
    pub segment_dir: PathBuf,

    /// Video name used to derive artifact names.
    #[arg(value_name = "VIDEO", env = "VROS_VIDEO")]
    pub video: String,

    /// Fetch mode and protocol tuning.
    #[command(flatten)]
    pub session: SessionConfig,

    /// Artifact storage.
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Size applied to trace samples without one.
    #[command(flatten)]
    pub fov_size: FovSize,

    /// Viewport trace file; defaults to `<VIDEO>-trace.txt` in the working
    /// directory.
    #[arg(long, env = "VROS_TRACE_FILE")]
    pub trace_file: Option<PathBuf>,

    /// External decoder invoked as `<PLAYER> <file> <start> <end|-1>`; playback
    /// requests are only logged when unset.
    #[arg(long, env = "VROS_PLAYER")]
    pub player: Option<String>,

    /// Writes the session report as JSON to this file.
    #[arg(long, env = "VROS_REPORT")]
    pub report: Option<PathBuf>,
}

impl PlayArgs {
    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.transport
            .validate()
            .context("invalid transport configuration")?;
        self.session
            .validate()
            .context("invalid session configuration")?;
        self.fov_size.validate().context("invalid FOV size")?;
        if self.video.trim().is_empty() {
            anyhow::bail!("video name is empty");
        }
        if self.player.as_deref().is_some_and(|p| p.trim().is_empty()) {
            anyhow::bail!("player command is empty");
        }
        Ok(())
    }

    /// Logs the configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            server = %self.transport.address(),
            segment_dir = %self.segment_dir.display(),
            video = %self.video,
            mode = %self.session.mode,
            threshold = self.session.threshold,
            frames_per_segment = self.session.frames_per_segment,
            fetch_retries = self.session.fetch_retries,
            storage = ?self.storage.storage,
            player = ?self.player,
            "Play configuration"
        );
    }
}
