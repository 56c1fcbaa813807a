//! Upstream WebSocket transport
//!
//! `FeedTransport` opens connections and `FeedConnection` is one open
//! session. Reconnection is driven by the feed client, not the transport.

mod client;
mod types;

pub use client::{WsClient, WsConnection};
pub use types::{WsConfig, WsError, WsMessage};

use async_trait::async_trait;

/// Factory for upstream connections
#[async_trait]
pub trait FeedTransport: Send + Sync {
    type Connection: FeedConnection;

    /// Open a new connection
    async fn connect(&self) -> Result<Self::Connection, WsError>;
}

/// One open upstream connection
#[async_trait]
pub trait FeedConnection: Send {
    /// Send a text message
    async fn send(&mut self, text: String) -> Result<(), WsError>;

    /// Wait for the next application message.
    ///
    /// `None` means the remote closed the connection cleanly.
    async fn recv(&mut self) -> Option<Result<WsMessage, WsError>>;
}
