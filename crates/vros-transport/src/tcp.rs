//! Lazily connected TCP transport.
//!
//! Each message travels as one length-delimited frame (4-byte big-endian
//! length, then a JSON body). The connection is opened on the first request
//! and reused for the rest of the session; a failed exchange drops it and the
//! error is returned to the caller, which decides whether the session ends.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::{
    ClientMessage, Result, ServerMessage, TRACING_TARGET_CONNECTION, TRACING_TARGET_EXCHANGE,
    Transport, TransportConfig, TransportError,
};

type Connection = Framed<TcpStream, LengthDelimitedCodec>;

/// TCP transport to one fixed negotiation server.
pub struct TcpTransport {
    config: TransportConfig,
    connection: Option<Connection>,
}

impl TcpTransport {
    /// Creates a transport; no connection is made until the first request.
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Returns true once a connection has been established and not dropped.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    async fn connect(&self) -> Result<Connection> {
        let address = self.config.address();
        let connect_timeout = self.config.connect_timeout();

        tracing::debug!(
            target: TRACING_TARGET_CONNECTION,
            address = %address,
            timeout_ms = connect_timeout.as_millis(),
            "Connecting to negotiation server"
        );

        let stream = timeout(connect_timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| TransportError::Timeout {
                timeout: connect_timeout,
            })?
            .map_err(|e| TransportError::connect(address.clone(), e))?;
        stream.set_nodelay(true)?;

        tracing::info!(
            target: TRACING_TARGET_CONNECTION,
            address = %address,
            "Connected to negotiation server"
        );

        Ok(Framed::new(stream, LengthDelimitedCodec::new()))
    }

    async fn exchange(connection: &mut Connection, payload: Bytes) -> Result<ServerMessage> {
        connection.send(payload).await?;

        let frame = connection.next().await.ok_or(TransportError::Closed)??;
        Ok(serde_json::from_slice(&frame)?)
    }
}

#[async_trait::async_trait]
impl Transport for TcpTransport {
    async fn request(&mut self, message: &ClientMessage) -> Result<ServerMessage> {
        let payload = Bytes::from(serde_json::to_vec(message)?);

        if self.connection.is_none() {
            self.connection = Some(self.connect().await?);
        }
        let Some(connection) = self.connection.as_mut() else {
            return Err(TransportError::Closed);
        };

        tracing::trace!(
            target: TRACING_TARGET_EXCHANGE,
            message = ?message,
            "Sending request"
        );

        let response = match self.config.request_timeout() {
            Some(limit) => timeout(limit, Self::exchange(connection, payload))
                .await
                .unwrap_or(Err(TransportError::Timeout { timeout: limit })),
            None => Self::exchange(connection, payload).await,
        };

        match response {
            Ok(response) => {
                tracing::trace!(
                    target: TRACING_TARGET_EXCHANGE,
                    response = ?response,
                    "Received response"
                );
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(
                    target: TRACING_TARGET_CONNECTION,
                    address = %self.config.address(),
                    error = %err,
                    "Exchange failed, dropping connection"
                );
                self.connection = None;
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpTransport")
            .field("address", &self.config.address())
            .field("connected", &self.is_connected())
            .finish()
    }
}
