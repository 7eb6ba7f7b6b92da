//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── play: PlayArgs
//! │   ├── transport: TransportConfig  # Server host, port, timeouts
//! │   ├── session: SessionConfig      # Mode, threshold, frames, retries
//! │   ├── storage: StorageArgs        # S3 bucket or local directory
//! │   └── fov_size: FovSize           # Default trace viewport size
//! └── manifest: ManifestArgs          # Segment directory, predictions
//!     ├── storage: StorageArgs        # Where `--publish` uploads to
//!     └── fov_size: FovSize           # Default prediction crop size
//! ```
//!
//! All configuration can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.

mod manifest;
mod play;
mod storage;

use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
pub use manifest::ManifestArgs;
pub use play::PlayArgs;
use serde::{Deserialize, Serialize};
pub use storage::{StorageArgs, StorageKind};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::TRACING_TARGET_STARTUP;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "vros")]
#[command(about = "Adaptive field-of-view streaming client for panoramic video")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Clone, Subcommand, Serialize, Deserialize)]
pub enum Command {
    /// Streams a video segment by segment.
    Play(PlayArgs),
    /// Builds a manifest from a segment directory and a prediction file.
    Manifest(ManifestArgs),
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so its values act
    /// as `env` defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with `RUST_LOG` filtering, `info` by default.
    pub fn init_tracing() -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .context("failed to create env filter")?;

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
            .context("failed to initialize tracing")?;

        Ok(())
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        match &self.command {
            Command::Play(args) => args.validate(),
            Command::Manifest(args) => args.validate(),
        }
    }

    /// Logs configuration and build information.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        match &self.command {
            Command::Play(args) => args.log(),
            Command::Manifest(args) => args.log(),
        }
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "fs").then_some("fs"),
            cfg!(feature = "s3").then_some("s3"),
            cfg!(feature = "dotenv").then_some("dotenv"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}
