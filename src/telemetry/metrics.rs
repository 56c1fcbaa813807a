//! Prometheus metrics

use std::net::SocketAddr;
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Time to score one price window
    SignalEvaluation,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Most recent upstream price
    LastPrice,
    /// Confidence of the most recent update
    LastConfidence,
    /// Registered subscribers
    Subscribers,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Quote deltas ingested
    Quotes,
    /// Frames dropped as malformed JSON
    FramesDropped,
    /// Reconnect cycles started
    Reconnects,
    /// Subscribers removed after a failed delivery
    SubscribersPruned,
}

impl LatencyMetric {
    pub fn name(self) -> &'static str {
        match self {
            LatencyMetric::SignalEvaluation => "goldfeed_signal_evaluation_latency_ms",
        }
    }
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::LastPrice => "goldfeed_last_price",
            GaugeMetric::LastConfidence => "goldfeed_last_confidence",
            GaugeMetric::Subscribers => "goldfeed_subscribers",
        }
    }
}

impl CounterMetric {
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::Quotes => "goldfeed_quotes_total",
            CounterMetric::FramesDropped => "goldfeed_frames_dropped_total",
            CounterMetric::Reconnects => "goldfeed_reconnects_total",
            CounterMetric::SubscribersPruned => "goldfeed_subscribers_pruned_total",
        }
    }
}

/// Record a latency measurement in milliseconds
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    metrics::histogram!(metric.name()).record(duration.as_secs_f64() * 1000.0);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    metrics::gauge!(metric.name()).set(value);
}

/// Increment a counter
pub fn increment_counter(metric: CounterMetric, n: u64) {
    metrics::counter!(metric.name()).increment(n);
}

/// Install the Prometheus recorder and serve `/metrics` on `port`
pub fn install_prometheus(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
