//! Session setup commands sent after the upstream connection opens

use super::FrameCodec;
use serde_json::json;
use uuid::Uuid;

/// Protocol hello sent before any command
pub const HELLO_TOKEN: &str = "~h~1";

const SESSION_PREFIX: &str = "qs_";
const SESSION_ID_LEN: usize = 12;

/// Identifier of one upstream quote session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteSession(String);

impl QuoteSession {
    /// Generate a fresh session id: `qs_` followed by 12 lowercase alphanumerics
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", SESSION_PREFIX, &simple[..SESSION_ID_LEN]))
    }

    /// Wrap an existing session id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QuoteSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the framed handshake, in send order:
/// hello, locale-set, create-session, add-symbol.
pub fn handshake_frames(
    session: &QuoteSession,
    symbol: &str,
    locale: &(String, String),
) -> Vec<String> {
    let set_locale = json!({"m": "set_locale", "p": [locale.0, locale.1]});
    let create_session = json!({"m": "quote_create_session", "p": [session.as_str()]});
    let add_symbols = json!({"m": "quote_add_symbols", "p": [session.as_str(), symbol]});

    vec![
        FrameCodec::encode(HELLO_TOKEN),
        FrameCodec::encode(&set_locale.to_string()),
        FrameCodec::encode(&create_session.to_string()),
        FrameCodec::encode(&add_symbols.to_string()),
    ]
}
