#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod playback;

use std::process;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "vros_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "vros_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "vros_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "vros_cli::command";
pub const TRACING_TARGET_PLAYER: &str = "vros_cli::player";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing()?;
    cli.log();
    cli.validate()?;

    match cli.command {
        Command::Play(args) => command::play(args).await,
        Command::Manifest(args) => command::build_manifest(args).await,
    }
}
