//! WebSocket types and configuration

use crate::config::FeedConfig;
use std::time::Duration;
use thiserror::Error;

/// WebSocket client configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// `Origin` header sent with the upgrade request
    pub origin: Option<String>,
    /// Interval for sending ping frames
    pub ping_interval: Duration,
    /// Time allowed for the TCP/TLS/upgrade handshake
    pub connect_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            origin: None,
            ping_interval: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Build from the feed section of the configuration file
    pub fn from_feed(feed: &FeedConfig) -> Self {
        Self {
            url: feed.url.clone(),
            origin: feed.origin.clone(),
            ping_interval: Duration::from_secs(feed.ping_interval_secs),
            connect_timeout: Duration::from_secs(feed.connect_timeout_secs),
        }
    }

    /// Set the `Origin` header
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }

    /// Set connect timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }
}

/// Application messages received from the upstream
#[derive(Debug, Clone, PartialEq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
}

/// WebSocket errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WsError {
    /// Connection failed or broke mid-stream
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Handshake did not complete in time
    #[error("Connect timed out after {0:?}")]
    ConnectTimeout(Duration),
    /// Upgrade request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// No pong arrived between two pings
    #[error("Pong timeout")]
    PongTimeout,
    /// Send failed
    #[error("Send failed: {0}")]
    SendFailed(String),
}
