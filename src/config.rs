//! Configuration types for goldfeed

use crate::telemetry::LogFormat;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub signal: SignalConfig,
    #[serde(default)]
    pub broadcast: BroadcastConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Upstream feed configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeedConfig {
    /// WebSocket endpoint of the quote feed
    pub url: String,
    /// `Origin` header for the upgrade request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Instrument to subscribe
    pub symbol: String,
    /// Language and country for the locale command
    pub locale: (String, String),
    /// Delay before reconnecting after a lost connection
    pub reconnect_delay_secs: u64,
    /// Cap for doubling backoff; equal to `reconnect_delay_secs` means flat
    pub max_reconnect_delay_secs: u64,
    /// WebSocket keepalive ping interval
    pub ping_interval_secs: u64,
    /// Timeout for establishing the connection
    pub connect_timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "wss://data.tradingview.com/socket.io/websocket".to_string(),
            origin: Some("https://www.tradingview.com".to_string()),
            symbol: "OANDA:XAUUSD".to_string(),
            locale: ("en".to_string(), "US".to_string()),
            reconnect_delay_secs: 5,
            max_reconnect_delay_secs: 5,
            ping_interval_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Rolling price window configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Number of samples kept
    pub capacity: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self { capacity: 30 }
    }
}

/// Signal generation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Samples required before a window is scored
    pub min_samples: usize,
    /// Probability above which the signal is BUY
    pub buy_threshold: f64,
    /// Probability below which the signal is SELL
    pub sell_threshold: f64,
    pub scorer: ScorerConfig,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_samples: 10,
            buy_threshold: 0.60,
            sell_threshold: 0.40,
            scorer: ScorerConfig::default(),
        }
    }
}

/// Coefficients of the built-in logistic scorer
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScorerConfig {
    pub momentum_weight: f64,
    pub trend_weight: f64,
    pub bias: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            momentum_weight: 5000.0,
            trend_weight: 0.1,
            bias: 0.0,
        }
    }
}

/// Subscriber fan-out configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BroadcastConfig {
    /// Per-subscriber relay queue depth
    pub queue_capacity: usize,
    /// Timeout for sending one update to a subscriber socket
    pub send_timeout_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            send_timeout_ms: 5000,
        }
    }
}

/// Subscriber server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus exporter port; disabled when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        let signal = &self.signal;
        if self.buffer.capacity == 0 {
            bail!("buffer.capacity must be at least 1");
        }
        if signal.min_samples < 2 {
            bail!("signal.min_samples must be at least 2");
        }
        for (name, value) in [
            ("buy_threshold", signal.buy_threshold),
            ("sell_threshold", signal.sell_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("signal.{name} must be within [0, 1], got {value}");
            }
        }
        if signal.sell_threshold >= signal.buy_threshold {
            bail!(
                "signal.sell_threshold ({}) must be below signal.buy_threshold ({})",
                signal.sell_threshold,
                signal.buy_threshold
            );
        }
        if self.buffer.capacity < signal.min_samples {
            tracing::warn!(
                capacity = self.buffer.capacity,
                min_samples = signal.min_samples,
                "Buffer smaller than min_samples, every update will HOLD"
            );
        }
        if self.feed.reconnect_delay_secs == 0 {
            bail!("feed.reconnect_delay_secs must be positive");
        }
        if self.feed.ping_interval_secs == 0 {
            bail!("feed.ping_interval_secs must be positive");
        }
        if self.broadcast.queue_capacity == 0 {
            bail!("broadcast.queue_capacity must be at least 1");
        }
        Ok(())
    }
}
