#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for connection establishment and teardown.
pub const TRACING_TARGET_CONNECTION: &str = "vros_transport::connection";

/// Tracing target for individual request/response exchanges.
pub const TRACING_TARGET_EXCHANGE: &str = "vros_transport::exchange";

mod config;
mod error;
mod message;
mod tcp;

#[doc(hidden)]
pub mod prelude;

pub use config::TransportConfig;
pub use error::{Result, TransportError};
pub use message::{ClientMessage, Decision, ServerMessage, Verdict};
pub use tcp::TcpTransport;
use vros_core::Viewport;

/// Blocking request/response exchange with the negotiation server.
///
/// Implementations carry one in-flight request at a time and are owned
/// exclusively by a single session.
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Sends `message` and waits for the server's response.
    async fn request(&mut self, message: &ClientMessage) -> Result<ServerMessage>;

    /// Sends the key-frame viewport of a segment and returns the server's
    /// path decision.
    async fn request_decision(&mut self, key_frame: &Viewport) -> Result<Decision> {
        let message = ClientMessage::KeyFrame {
            viewport: *key_frame,
        };
        match self.request(&message).await? {
            ServerMessage::Decision { decision } => Ok(decision),
            other => Err(TransportError::unexpected("decision", &other)),
        }
    }

    /// Reports the verification verdict of a FOV segment.
    async fn send_verdict(&mut self, verdict: Verdict) -> Result<()> {
        match self.request(&ClientMessage::Verdict { verdict }).await? {
            ServerMessage::Ack => Ok(()),
            other => Err(TransportError::unexpected("ack", &other)),
        }
    }
}
