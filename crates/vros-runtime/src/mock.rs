//! In-memory collaborators for driving sessions in tests.
//!
//! Every mock is a cheap handle over shared state: keep a clone before
//! handing one to a [`Session`](crate::Session) and inspect it afterwards.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use vros_opendal::{StorageError, StorageResult};
use vros_transport::{
    ClientMessage, Decision, Result, ServerMessage, Transport, TransportError, Verdict,
};

use crate::{ArtifactFetcher, Playback, PlaybackRequest};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct TransportState {
    script: VecDeque<Decision>,
    repeat: Option<Decision>,
    fail_after: Option<usize>,
    requests: Vec<ClientMessage>,
}

/// Negotiation server stand-in answering key frames from a script.
///
/// Verdicts are always acknowledged. A key frame arriving after the script
/// is exhausted is answered by closing the connection.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<TransportState>>,
}

impl MockTransport {
    /// Answers every key frame with `decision`.
    pub fn always(decision: Decision) -> Self {
        let transport = Self::default();
        lock(&transport.state).repeat = Some(decision);
        transport
    }

    /// Answers key frames with `decisions`, in order.
    pub fn scripted(decisions: impl IntoIterator<Item = Decision>) -> Self {
        let transport = Self::default();
        lock(&transport.state).script = decisions.into_iter().collect();
        transport
    }

    /// Resets the connection on every request after the first `requests`.
    #[must_use]
    pub fn failing_after(self, requests: usize) -> Self {
        lock(&self.state).fail_after = Some(requests);
        self
    }

    /// Returns every request received, in order.
    pub fn requests(&self) -> Vec<ClientMessage> {
        lock(&self.state).requests.clone()
    }

    /// Returns the number of completed and attempted round trips.
    pub fn round_trips(&self) -> usize {
        lock(&self.state).requests.len()
    }

    /// Returns the frame index of every key frame received, in order.
    pub fn key_frames(&self) -> Vec<u32> {
        self.requests()
            .iter()
            .filter_map(|message| match message {
                ClientMessage::KeyFrame { viewport } => Some(viewport.frame_index()),
                ClientMessage::Verdict { .. } => None,
            })
            .collect()
    }

    /// Returns every verdict received, in order.
    pub fn verdicts(&self) -> Vec<Verdict> {
        self.requests()
            .iter()
            .filter_map(|message| match message {
                ClientMessage::Verdict { verdict } => Some(*verdict),
                ClientMessage::KeyFrame { .. } => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn request(&mut self, message: &ClientMessage) -> Result<ServerMessage> {
        let mut state = lock(&self.state);
        state.requests.push(message.clone());

        if state
            .fail_after
            .is_some_and(|limit| state.requests.len() > limit)
        {
            return Err(TransportError::Io(io::Error::from(
                io::ErrorKind::ConnectionReset,
            )));
        }

        match message {
            ClientMessage::KeyFrame { .. } => {
                let decision = match state.script.pop_front() {
                    Some(decision) => decision,
                    None => state.repeat.ok_or(TransportError::Closed)?,
                };
                Ok(ServerMessage::Decision { decision })
            }
            ClientMessage::Verdict { .. } => Ok(ServerMessage::Ack),
        }
    }
}

#[derive(Debug, Default)]
struct FetcherState {
    missing: Vec<String>,
    transient: HashMap<String, u32>,
    fetches: Vec<String>,
}

/// Storage stand-in that writes local files.
///
/// Every object is served with its own name as contents, unless marked
/// missing.
#[derive(Debug, Clone, Default)]
pub struct MockFetcher {
    state: Arc<Mutex<FetcherState>>,
}

impl MockFetcher {
    /// Creates a fetcher serving every object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports `remote` as not found.
    #[must_use]
    pub fn with_missing(self, remote: impl Into<String>) -> Self {
        lock(&self.state).missing.push(remote.into());
        self
    }

    /// Fails the first `failures` reads of `remote` with a retryable error.
    #[must_use]
    pub fn with_transient_failures(self, remote: impl Into<String>, failures: u32) -> Self {
        lock(&self.state).transient.insert(remote.into(), failures);
        self
    }

    /// Returns every attempted fetch, in order.
    pub fn fetches(&self) -> Vec<String> {
        lock(&self.state).fetches.clone()
    }
}

#[async_trait::async_trait]
impl ArtifactFetcher for MockFetcher {
    async fn fetch(&self, remote: &str, local: &Path) -> StorageResult<u64> {
        let contents = {
            let mut state = lock(&self.state);
            state.fetches.push(remote.to_owned());

            if state.missing.iter().any(|name| name == remote) {
                return Err(StorageError::not_found(remote));
            }
            if let Some(remaining) = state.transient.get_mut(remote).filter(|n| **n > 0) {
                *remaining -= 1;
                return Err(StorageError::transfer(remote, "connection reset"));
            }

            remote.as_bytes().to_vec()
        };

        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::local_write(parent, e))?;
        }
        tokio::fs::write(local, &contents)
            .await
            .map_err(|e| StorageError::local_write(local, e))?;

        Ok(contents.len() as u64)
    }
}

/// Playback sink that records requests.
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayback {
    requests: Arc<Mutex<Vec<PlaybackRequest>>>,
}

impl RecordingPlayback {
    /// Returns every playback request, in order.
    pub fn requests(&self) -> Vec<PlaybackRequest> {
        lock(&self.requests).clone()
    }
}

impl Playback for RecordingPlayback {
    fn play(&self, request: PlaybackRequest) {
        lock(&self.requests).push(request);
    }
}
