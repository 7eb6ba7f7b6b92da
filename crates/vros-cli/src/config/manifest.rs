//! Manifest build configuration.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::{Deserialize, Serialize};
use vros_core::FovSize;

use super::StorageArgs;
use crate::TRACING_TARGET_CONFIG;

/// Arguments of the `manifest` command.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ManifestArgs {
    /// Directory with one encoded full-size file per segment.
    #[arg(value_name = "SEGMENT_DIR")]
    pub segment_dir: PathBuf,

    /// Prediction file with `segment path frame x y [width height]` lines.
    #[arg(value_name = "PREDICTIONS")]
    pub prediction_file: PathBuf,

    /// Output file; the manifest is printed to stdout when unset.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Uploads the manifest to storage as `<VIDEO>-manifest.txt`.
    #[arg(long, value_name = "VIDEO")]
    pub publish: Option<String>,

    /// Storage the manifest is published to.
    #[command(flatten)]
    pub storage: StorageArgs,

    /// Size applied to prediction lines without one.
    #[command(flatten)]
    pub fov_size: FovSize,
}

impl ManifestArgs {
    /// Validates the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.fov_size.validate().context("invalid FOV size")?;
        if self.publish.as_deref().is_some_and(|v| v.trim().is_empty()) {
            anyhow::bail!("video name to publish under is empty");
        }
        Ok(())
    }

    /// Logs the configuration.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            segment_dir = %self.segment_dir.display(),
            prediction_file = %self.prediction_file.display(),
            output = ?self.output,
            publish = ?self.publish,
            fov_width = self.fov_size.width,
            fov_height = self.fov_size.height,
            "Manifest configuration"
        );
    }
}
