//! Price feed types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single last-traded price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Last traded price
    pub price: f64,
    /// Local timestamp when the quote was received
    pub timestamp: DateTime<Utc>,
}

impl PriceSample {
    /// Create a sample stamped with the current time
    pub fn now(price: f64) -> Self {
        Self {
            price,
            timestamp: Utc::now(),
        }
    }
}

/// Lifecycle state of the upstream connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    ReconnectWait,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::ReconnectWait => "reconnect_wait",
        };
        f.write_str(s)
    }
}
