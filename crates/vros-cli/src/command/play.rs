//! `play` command.

use std::path::PathBuf;

use anyhow::Context;
use vros_core::{SegmentNaming, ViewportTrace};
use vros_opendal::StorageBackend;
use vros_runtime::{
    Playback, Session, SessionConfig, SessionContext, SessionMode, SessionReport, TracingPlayback,
    fetch_manifest,
};
use vros_transport::TcpTransport;

use super::shutdown::shutdown_signal;
use crate::TRACING_TARGET_COMMAND;
use crate::config::PlayArgs;
use crate::playback::CommandPlayback;

/// Downloads the manifest, loads the viewport trace and runs a session.
pub async fn play(args: PlayArgs) -> anyhow::Result<()> {
    let storage = StorageBackend::new(args.storage.to_config())
        .context("failed to initialize storage backend")?;
    let naming = SegmentNaming::new(&args.video, &args.segment_dir);

    let manifest = fetch_manifest(&storage, &naming)
        .await
        .with_context(|| format!("failed to fetch manifest of '{}'", args.video))?;

    let trace = match args.session.mode {
        SessionMode::Svr => {
            let path = args
                .trace_file
                .clone()
                .unwrap_or_else(|| PathBuf::from(naming.trace_file()));
            ViewportTrace::load(&path, args.fov_size)
                .await
                .with_context(|| format!("failed to load viewport trace {}", path.display()))?
        }
        SessionMode::Baseline => ViewportTrace::default(),
    };

    let context = SessionContext {
        manifest,
        trace,
        naming,
    };
    let transport = TcpTransport::new(args.transport.clone());

    let report = match args.player.as_deref() {
        Some(command) => {
            let playback = CommandPlayback::parse(command)?;
            run_session(args.session, context, transport, storage, playback).await?
        }
        None => run_session(args.session, context, transport, storage, TracingPlayback).await?,
    };

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&report)?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    tracing::info!(
        target: TRACING_TARGET_COMMAND,
        segments = report.segments.len(),
        accepted = report.accepted(),
        rejected = report.rejected(),
        fallbacks = report.fallbacks(),
        fetch_failures = report.fetch_failures(),
        "Playback complete"
    );

    Ok(())
}

/// Runs the session until it finishes or the process is interrupted.
async fn run_session<P: Playback>(
    config: SessionConfig,
    context: SessionContext,
    transport: TcpTransport,
    storage: StorageBackend,
    playback: P,
) -> anyhow::Result<SessionReport> {
    let session = Session::new(config, context, transport, storage, playback)
        .context("failed to create session")?;

    tokio::select! {
        report = session.run() => report.context("session failed"),
        () = shutdown_signal() => Err(anyhow::anyhow!("session interrupted")),
    }
}
