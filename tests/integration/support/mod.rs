//! Scripted in-memory upstream transport for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use goldfeed::codec::{FrameCodec, Payload};
use goldfeed::ws::{FeedConnection, FeedTransport, WsError, WsMessage};
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};

/// Transport whose connections are handed out by the test, one per attempt
pub struct ScriptedTransport {
    sessions: Mutex<mpsc::UnboundedReceiver<Result<ScriptedConnection, WsError>>>,
}

/// Test-side handle used to answer connection attempts
pub type Connector = mpsc::UnboundedSender<Result<ScriptedConnection, WsError>>;

impl ScriptedTransport {
    pub fn new() -> (Self, Connector) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sessions: Mutex::new(rx),
            },
            tx,
        )
    }
}

#[async_trait]
impl FeedTransport for ScriptedTransport {
    type Connection = ScriptedConnection;

    async fn connect(&self) -> Result<ScriptedConnection, WsError> {
        match self.sessions.lock().await.recv().await {
            Some(result) => result,
            None => Err(WsError::ConnectionFailed("script finished".into())),
        }
    }
}

/// Client side of one scripted connection
pub struct ScriptedConnection {
    inbound: mpsc::UnboundedReceiver<Result<WsMessage, WsError>>,
    outbound: mpsc::UnboundedSender<String>,
}

/// Test side of one scripted connection
pub struct Remote {
    /// Messages the feed client will receive; dropping it closes the connection
    pub inbound: mpsc::UnboundedSender<Result<WsMessage, WsError>>,
    /// Messages the feed client sent
    pub outbound: mpsc::UnboundedReceiver<String>,
}

impl Remote {
    pub fn push_text(&self, text: impl Into<String>) {
        self.inbound
            .send(Ok(WsMessage::Text(text.into())))
            .expect("feed client dropped the connection");
    }

    pub fn push_error(&self, error: WsError) {
        self.inbound
            .send(Err(error))
            .expect("feed client dropped the connection");
    }

    /// Wait for the next `n` messages sent by the client
    pub async fn sent(&mut self, n: usize) -> Vec<String> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.outbound.recv().await.expect("connection closed"));
        }
        out
    }
}

#[async_trait]
impl FeedConnection for ScriptedConnection {
    async fn send(&mut self, text: String) -> Result<(), WsError> {
        self.outbound
            .send(text)
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }

    async fn recv(&mut self) -> Option<Result<WsMessage, WsError>> {
        self.inbound.recv().await
    }
}

pub fn connection() -> (ScriptedConnection, Remote) {
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    (
        ScriptedConnection {
            inbound: in_rx,
            outbound: out_tx,
        },
        Remote {
            inbound: in_tx,
            outbound: out_rx,
        },
    )
}

/// Framed quote delta for `price`
pub fn quote_frame(price: f64) -> String {
    let doc = serde_json::json!({
        "m": "qsd",
        "p": ["qs_test", {"n": "OANDA:XAUUSD", "s": "ok", "v": {"lp": price}}]
    });
    FrameCodec::encode(&doc.to_string())
}

/// Check the four handshake frames and return the quote session id
pub fn assert_handshake(frames: &[String], symbol: &str) -> String {
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[0], "~m~4~m~~h~1");

    let docs: Vec<Value> = frames[1..]
        .iter()
        .map(|f| match FrameCodec::decode(f).pop() {
            Some(Payload::Json(v)) => v,
            other => panic!("expected JSON command, got {other:?}"),
        })
        .collect();

    assert_eq!(docs[0]["m"], "set_locale");
    assert_eq!(docs[1]["m"], "quote_create_session");
    assert_eq!(docs[2]["m"], "quote_add_symbols");

    let session = docs[1]["p"][0].as_str().expect("session id").to_string();
    assert_eq!(docs[2]["p"][0], session.as_str());
    assert_eq!(docs[2]["p"][1], symbol);
    session
}
