//! WebSocket client with ping/pong keepalive

use super::types::{WsConfig, WsError, WsMessage};
use super::{FeedConnection, FeedTransport};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

/// Upstream WebSocket transport
pub struct WsClient {
    config: WsConfig,
}

impl WsClient {
    /// Create a new WebSocket client with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Create a new client with just a URL using default config
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::new(WsConfig::new(url))
    }

    /// Get the configured URL
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Build the upgrade request, including the `Origin` header if configured
    fn build_request(&self) -> Result<Request, WsError> {
        let mut request = self
            .config
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| WsError::InvalidRequest(e.to_string()))?;

        if let Some(ref origin) = self.config.origin {
            let value = HeaderValue::from_str(origin)
                .map_err(|e| WsError::InvalidRequest(e.to_string()))?;
            request.headers_mut().insert("Origin", value);
        }

        Ok(request)
    }
}

#[async_trait]
impl FeedTransport for WsClient {
    type Connection = WsConnection;

    async fn connect(&self) -> Result<WsConnection, WsError> {
        let request = self.build_request()?;
        tracing::info!(url = %self.config.url, "Connecting to WebSocket");

        let (ws_stream, _response) =
            tokio::time::timeout(self.config.connect_timeout, connect_async(request))
                .await
                .map_err(|_| WsError::ConnectTimeout(self.config.connect_timeout))?
                .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        tracing::info!("WebSocket connected");
        Ok(WsConnection::new(ws_stream, self.config.ping_interval))
    }
}

/// An open upstream WebSocket
pub struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ping_interval: Interval,
    waiting_for_pong: bool,
}

impl WsConnection {
    fn new(stream: WebSocketStream<MaybeTlsStream<TcpStream>>, ping_every: Duration) -> Self {
        let mut ping_interval = interval_at(Instant::now() + ping_every, ping_every);
        ping_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            stream,
            ping_interval,
            waiting_for_pong: false,
        }
    }
}

#[async_trait]
impl FeedConnection for WsConnection {
    async fn send(&mut self, text: String) -> Result<(), WsError> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<WsMessage, WsError>> {
        loop {
            tokio::select! {
                msg = self.stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => return Some(Ok(WsMessage::Text(text))),
                        Some(Ok(Message::Binary(data))) => return Some(Ok(WsMessage::Binary(data))),
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = self.stream.send(Message::Pong(data)).await {
                                return Some(Err(WsError::SendFailed(e.to_string())));
                            }
                        }
                        Some(Ok(Message::Pong(_))) => {
                            self.waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            return None;
                        }
                        Some(Ok(Message::Frame(_))) => {}
                        Some(Err(e)) => {
                            return Some(Err(WsError::ConnectionFailed(e.to_string())));
                        }
                        None => {
                            return Some(Err(WsError::ConnectionFailed(
                                "Stream ended unexpectedly".into(),
                            )));
                        }
                    }
                }

                _ = self.ping_interval.tick() => {
                    if self.waiting_for_pong {
                        return Some(Err(WsError::PongTimeout));
                    }
                    if let Err(e) = self.stream.send(Message::Ping(Vec::new())).await {
                        return Some(Err(WsError::SendFailed(e.to_string())));
                    }
                    self.waiting_for_pong = true;
                }
            }
        }
    }
}
