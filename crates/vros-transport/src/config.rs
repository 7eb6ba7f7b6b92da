//! Transport configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Result, TransportError};

/// Address and timeouts of the negotiation server connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct TransportConfig {
    /// Host name or IP address of the negotiation server.
    #[cfg_attr(feature = "config", arg(value_name = "HOST", env = "VROS_SERVER_HOST"))]
    pub host: String,

    /// TCP port of the negotiation server.
    #[cfg_attr(feature = "config", arg(value_name = "PORT", env = "VROS_SERVER_PORT"))]
    pub port: u16,

    /// Connection timeout in seconds (optional)
    #[cfg_attr(
        feature = "config",
        arg(long = "connect-timeout", env = "VROS_CONNECT_TIMEOUT_SECS")
    )]
    pub connect_timeout_secs: Option<u64>,

    /// Time to wait for a server response in seconds; waits indefinitely
    /// when unset.
    #[cfg_attr(
        feature = "config",
        arg(long = "request-timeout", env = "VROS_REQUEST_TIMEOUT_SECS")
    )]
    pub request_timeout_secs: Option<u64>,
}

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

impl TransportConfig {
    /// Creates a configuration for `host:port` with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout_secs: None,
            request_timeout_secs: None,
        }
    }

    /// Returns the `host:port` address string.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the connection timeout.
    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connect_timeout_secs
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        )
    }

    /// Returns the response timeout, if any.
    #[inline]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Sets the response timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(TransportError::invalid_config("server host is empty"));
        }
        if self.port == 0 {
            return Err(TransportError::invalid_config("server port must be non-zero"));
        }
        if self.connect_timeout_secs == Some(0) || self.request_timeout_secs == Some(0) {
            return Err(TransportError::invalid_config(
                "timeouts must be at least one second",
            ));
        }
        Ok(())
    }
}
