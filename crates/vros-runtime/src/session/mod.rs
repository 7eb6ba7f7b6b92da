//! Segment-by-segment fetch decision protocol.
//!
//! A [`Session`] walks the manifest's segments in id order. In `SVR` mode
//! each segment is negotiated: the key-frame viewport goes to the server,
//! the server picks the full segment or one predicted path, and a chosen
//! FOV crop is verified against the viewer's trace before a verdict is
//! reported. A rejected crop is played up to the first failing frame and
//! the full segment covers the rest. `BASELINE` mode never contacts the
//! server.

mod report;
mod state;
mod verify;

use std::path::Path;

use vros_core::{FrameIndex, Manifest, SegmentId, SegmentNaming, ViewportTrace};
use vros_opendal::StorageError;
use vros_transport::{Decision, Transport, Verdict};

pub use self::report::{SegmentOutcome, SessionReport};
pub use self::state::SegmentState;
pub use self::verify::{Verification, verify};
use crate::{
    ArtifactFetcher, Playback, PlaybackRequest, Result, RetryConfig, SessionConfig, SessionMode,
    TRACING_TARGET_FETCH, TRACING_TARGET_SESSION,
};

/// Read-only data a session consults.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Segment sizes and predicted paths.
    pub manifest: Manifest,
    /// Where the viewer actually looked, by absolute frame.
    pub trace: ViewportTrace,
    /// Remote and local artifact names.
    pub naming: SegmentNaming,
}

/// Protocol driver owning its transport, fetcher and playback sink for the
/// whole session.
pub struct Session<T, F, P> {
    config: SessionConfig,
    retry: RetryConfig,
    context: SessionContext,
    transport: T,
    fetcher: F,
    playback: P,
    segment_id: SegmentId,
    key_frame: FrameIndex,
}

impl<T, F, P> Session<T, F, P>
where
    T: Transport,
    F: ArtifactFetcher,
    P: Playback,
{
    /// Creates a session positioned before segment 1.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidConfig`](crate::SessionError::InvalidConfig)
    /// if `config` does not validate.
    pub fn new(
        config: SessionConfig,
        context: SessionContext,
        transport: T,
        fetcher: F,
        playback: P,
    ) -> Result<Self> {
        config.validate()?;
        let key_frame = SegmentId::FIRST.key_frame(config.frames_per_segment);

        Ok(Self {
            retry: config.retry(),
            config,
            context,
            transport,
            fetcher,
            playback,
            segment_id: SegmentId::FIRST,
            key_frame,
        })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the manifest, trace and naming in use.
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Processes every segment of the manifest in order.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal error: a transport failure, a key frame or
    /// verified frame missing from the trace, or a server decision naming a
    /// path the manifest does not have. Failed downloads are not fatal and
    /// are listed in the report.
    pub async fn run(mut self) -> Result<SessionReport> {
        let segment_count = self.context.manifest.segment_count();
        tracing::info!(
            target: TRACING_TARGET_SESSION,
            video = self.context.naming.video(),
            mode = %self.config.mode,
            segments = segment_count,
            threshold = self.config.threshold,
            frames_per_segment = self.config.frames_per_segment,
            "Session started"
        );
        if self.config.mode == SessionMode::Svr && !self.context.manifest.has_predictions() {
            tracing::warn!(
                target: TRACING_TARGET_SESSION,
                "Manifest carries no predicted paths, expecting full-segment decisions"
            );
        }

        let mut report = SessionReport::default();
        while self.segment_id.get() <= segment_count {
            let outcome = self.process_segment().await?;
            report.segments.push(outcome);

            self.segment_id = self.segment_id.next();
            self.key_frame = self.segment_id.key_frame(self.config.frames_per_segment);
        }

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            segments = report.segments.len(),
            accepted = report.accepted(),
            rejected = report.rejected(),
            fallbacks = report.fallbacks(),
            fetch_failures = report.fetch_failures(),
            "Session finished"
        );

        Ok(report)
    }

    async fn process_segment(&mut self) -> Result<SegmentOutcome> {
        let segment_id = self.segment_id;
        let frames = self.config.frames_per_segment;
        let byte_size = self.context.manifest.segment_byte_size(segment_id)?;
        tracing::debug!(
            target: TRACING_TARGET_SESSION,
            segment_id = %segment_id,
            key_frame = self.key_frame,
            byte_size = ?byte_size,
            "Segment started"
        );

        let mut outcome = SegmentOutcome::new(segment_id);
        let mut state = match self.config.mode {
            SessionMode::Baseline => SegmentState::FullFetch,
            SessionMode::Svr => SegmentState::AwaitTrace,
        };

        loop {
            tracing::trace!(
                target: TRACING_TARGET_SESSION,
                segment_id = %segment_id,
                state = state.name(),
                "Segment state"
            );

            state = match state {
                SegmentState::AwaitTrace => {
                    let key_frame = *self.context.trace.viewport(self.key_frame)?;
                    SegmentState::RequestSent { key_frame }
                }

                SegmentState::RequestSent { key_frame } => {
                    let decision = self.transport.request_decision(&key_frame).await?;
                    SegmentState::DecisionReceived { decision }
                }

                SegmentState::DecisionReceived { decision } => {
                    tracing::info!(
                        target: TRACING_TARGET_SESSION,
                        segment_id = %segment_id,
                        decision = %decision,
                        "Decision received"
                    );
                    outcome.decision = Some(decision);
                    match decision {
                        Decision::Full => SegmentState::FullFetch,
                        Decision::Fov(path_id) => SegmentState::FovVerify { path_id },
                    }
                }

                SegmentState::FullFetch => {
                    let remote = self.context.naming.remote_full(segment_id);
                    let local = self.context.naming.local_full(segment_id);
                    if self.fetch(&remote, &local, &mut outcome).await {
                        self.playback.play(PlaybackRequest::to_end(local, 0));
                    }
                    SegmentState::Done
                }

                SegmentState::FovVerify { path_id } => {
                    // Resolve the path before downloading so an invalid decision
                    // fails without side effects.
                    let path = self.context.manifest.predicted_path(segment_id, path_id)?;
                    let remote = self.context.naming.remote_fov(segment_id, path_id);
                    let local = self.context.naming.local_fov(segment_id, path_id);

                    let decoded_frames = if self.fetch(&remote, &local, &mut outcome).await {
                        let verification = verify(
                            path,
                            &self.context.trace,
                            self.key_frame,
                            frames,
                            self.config.threshold,
                        )?;
                        match verification.decoded_frames {
                            n if verification.passed() => {
                                self.playback.play(PlaybackRequest::to_end(&local, 0));
                                n
                            }
                            0 => 0,
                            n => {
                                self.playback.play(PlaybackRequest::range(&local, 0, n - 1));
                                n
                            }
                        }
                    } else {
                        0
                    };

                    outcome.decoded_frames = Some(decoded_frames);
                    if decoded_frames == frames {
                        SegmentState::Accepted
                    } else {
                        SegmentState::Rejected { decoded_frames }
                    }
                }

                SegmentState::Accepted => {
                    self.report_verdict(Verdict::Good, &mut outcome).await?;
                    SegmentState::Done
                }

                SegmentState::Rejected { decoded_frames } => {
                    self.report_verdict(Verdict::Bad, &mut outcome).await?;
                    SegmentState::FallbackFetch { decoded_frames }
                }

                SegmentState::FallbackFetch { decoded_frames } => {
                    outcome.fallback = true;
                    let remote = self.context.naming.remote_full(segment_id);
                    let local = self.context.naming.local_full(segment_id);
                    if self.fetch(&remote, &local, &mut outcome).await {
                        self.playback
                            .play(PlaybackRequest::to_end(local, decoded_frames));
                    }
                    SegmentState::Done
                }

                SegmentState::Done => break,
            };
        }

        tracing::debug!(
            target: TRACING_TARGET_SESSION,
            segment_id = %segment_id,
            verdict = ?outcome.verdict,
            decoded_frames = ?outcome.decoded_frames,
            fallback = outcome.fallback,
            "Segment finished"
        );

        Ok(outcome)
    }

    async fn report_verdict(&mut self, verdict: Verdict, outcome: &mut SegmentOutcome) -> Result<()> {
        tracing::info!(
            target: TRACING_TARGET_SESSION,
            segment_id = %outcome.segment_id,
            verdict = %verdict,
            decoded_frames = ?outcome.decoded_frames,
            "Reporting verdict"
        );
        self.transport.send_verdict(verdict).await?;
        outcome.verdict = Some(verdict);
        Ok(())
    }

    /// Downloads one artifact, recording a failure in `outcome`. Returns
    /// true if the local file is ready.
    async fn fetch(&self, remote: &str, local: &Path, outcome: &mut SegmentOutcome) -> bool {
        let result = self
            .retry
            .retry_if(
                || self.fetcher.fetch(remote, local),
                StorageError::is_retryable,
            )
            .await;

        match result {
            Ok(size) => {
                tracing::debug!(
                    target: TRACING_TARGET_FETCH,
                    remote = %remote,
                    size,
                    "Artifact ready"
                );
                true
            }
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_FETCH,
                    segment_id = %outcome.segment_id,
                    remote = %remote,
                    error = %err,
                    "Artifact download failed"
                );
                outcome.fetch_failures.push(format!("{remote}: {err}"));
                false
            }
        }
    }
}

impl<T, F, P> std::fmt::Debug for Session<T, F, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.config.mode)
            .field("video", &self.context.naming.video())
            .field("segment_id", &self.segment_id)
            .field("key_frame", &self.key_frame)
            .finish()
    }
}
