//! Prelude module for convenient imports.

pub use crate::config::TransportConfig;
pub use crate::error::{Result, TransportError};
pub use crate::message::{ClientMessage, Decision, ServerMessage, Verdict};
pub use crate::tcp::TcpTransport;
pub use crate::Transport;
