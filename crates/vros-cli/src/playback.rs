//! External decoder playback.

use std::process::{ExitStatus, Stdio};

use anyhow::Context;
use tokio::process::Command;
use vros_runtime::{Playback, PlaybackRequest};

use crate::TRACING_TARGET_PLAYER;

/// Hands each playback request to an external decoder process.
///
/// The decoder is run as `<program> [args..] <file> <start> <end>`, with
/// `-1` as the end of a request that plays to the end of the segment. The
/// process is not awaited by the session; its exit status is logged.
#[derive(Debug, Clone)]
pub struct CommandPlayback {
    program: String,
    args: Vec<String>,
}

impl CommandPlayback {
    /// Parses a whitespace-separated command line.
    pub fn parse(command: &str) -> anyhow::Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts.next().context("player command is empty")?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Returns the decoder arguments for `request`.
    fn arguments(&self, request: &PlaybackRequest) -> Vec<String> {
        let end = request.end_frame.map_or(-1, i64::from);
        let mut args = self.args.clone();
        args.push(request.file.display().to_string());
        args.push(request.start_frame.to_string());
        args.push(end.to_string());
        args
    }

    fn report(&self, request: &PlaybackRequest, status: std::io::Result<ExitStatus>) {
        match status {
            Ok(status) if status.success() => tracing::debug!(
                target: TRACING_TARGET_PLAYER,
                request = %request,
                "Decoder finished"
            ),
            Ok(status) => tracing::warn!(
                target: TRACING_TARGET_PLAYER,
                request = %request,
                status = %status,
                "Decoder exited with failure"
            ),
            Err(err) => tracing::warn!(
                target: TRACING_TARGET_PLAYER,
                program = %self.program,
                request = %request,
                error = %err,
                "Decoder could not run"
            ),
        }
    }
}

impl Playback for CommandPlayback {
    fn play(&self, request: PlaybackRequest) {
        let spawned = Command::new(&self.program)
            .args(self.arguments(&request))
            .stdin(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(err) => {
                self.report(&request, Err(err));
                return;
            }
        };

        tracing::info!(
            target: TRACING_TARGET_PLAYER,
            request = %request,
            pid = ?child.id(),
            "Decoder started"
        );

        let playback = self.clone();
        tokio::spawn(async move {
            let status = child.wait().await;
            playback.report(&request, status);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments() {
        let playback = CommandPlayback::parse("ffplay -autoexit").unwrap();
        assert_eq!(
            playback.arguments(&PlaybackRequest::range("seg/segment_1_0.mp4", 0, 4)),
            vec!["-autoexit", "seg/segment_1_0.mp4", "0", "4"]
        );
        assert_eq!(
            playback.arguments(&PlaybackRequest::to_end("seg/segment_1.mp4", 5)),
            vec!["-autoexit", "seg/segment_1.mp4", "5", "-1"]
        );
    }

    #[test]
    fn test_empty_command_is_rejected() {
        assert!(CommandPlayback::parse("   ").is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_runs_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("args.txt");
        let script_path = dir.path().join("decode.sh");
        tokio::fs::write(
            &script_path,
            format!("#!/bin/sh\necho \"$@\" > {}\n", out.display()),
        )
        .await
        .unwrap();

        let playback = CommandPlayback::parse(&format!("sh {}", script_path.display())).unwrap();
        playback.play(PlaybackRequest::to_end("segment_2.mp4", 3));

        for _ in 0..100 {
            if let Ok(written) = tokio::fs::read_to_string(&out).await
                && !written.is_empty()
            {
                assert_eq!(written.trim(), "segment_2.mp4 3 -1");
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("decoder did not run");
    }
}
