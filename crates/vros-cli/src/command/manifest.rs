//! `manifest` command.

use anyhow::Context;
use vros_core::{Manifest, SegmentNaming};
use vros_opendal::StorageBackend;

use crate::TRACING_TARGET_COMMAND;
use crate::config::ManifestArgs;

/// Builds a manifest, writes it to the output file or stdout, and
/// optionally uploads it to storage.
pub async fn build_manifest(args: ManifestArgs) -> anyhow::Result<()> {
    let manifest = Manifest::build(&args.segment_dir, &args.prediction_file, args.fov_size)
        .await
        .with_context(|| {
            format!(
                "failed to build manifest from {}",
                args.segment_dir.display()
            )
        })?;

    match &args.output {
        Some(output) => {
            manifest
                .write(output)
                .await
                .with_context(|| format!("failed to write manifest to {}", output.display()))?;
            tracing::info!(
                target: TRACING_TARGET_COMMAND,
                output = %output.display(),
                segments = manifest.segment_count(),
                "Manifest written"
            );
        }
        None if args.publish.is_none() => println!("{}", manifest.to_json()?),
        None => {}
    }

    if let Some(video) = &args.publish {
        let storage = StorageBackend::new(args.storage.to_config())
            .context("failed to initialize storage backend")?;
        let remote = SegmentNaming::new(video, &args.segment_dir).remote_manifest();
        storage
            .write(&remote, manifest.to_json()?.as_bytes())
            .await
            .with_context(|| format!("failed to publish manifest as '{remote}'"))?;
        tracing::info!(
            target: TRACING_TARGET_COMMAND,
            remote = %remote,
            segments = manifest.segment_count(),
            "Manifest published"
        );
    }

    Ok(())
}
