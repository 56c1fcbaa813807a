//! Upstream feed client
//!
//! Owns the connection lifecycle (connect, handshake, decode loop, reconnect)
//! and the ingestion path: every recognised quote is appended to the price
//! buffer, scored, and published to the broadcast hub.

use super::{ConnectionState, PriceBuffer, PriceSample};
use crate::broadcast::{BroadcastHub, PublishReport};
use crate::codec::{extract_quote, handshake_frames, FrameCodec, QuoteSession};
use crate::config::FeedConfig;
use crate::signal::{SignalEngine, Update};
use crate::telemetry::{
    increment_counter, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};
use crate::ws::{FeedConnection, FeedTransport, WsError, WsMessage};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;

/// Errors that end one upstream session
#[derive(Debug, Error)]
pub enum FeedError {
    /// Connect failed or the connection broke mid-stream
    #[error("transport error: {0}")]
    Transport(#[from] WsError),
    /// A session-setup command could not be sent
    #[error("handshake failed: {0}")]
    Handshake(WsError),
}

/// Delay between a lost connection and the next attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Delay after a session that reached OPEN, and the floor for backoff
    pub initial_delay: Duration,
    /// Cap for the doubling delay; equal to `initial_delay` for a flat delay
    pub max_delay: Duration,
}

impl ReconnectPolicy {
    /// Constant delay, retried forever
    pub fn flat(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            max_delay: delay,
        }
    }

    /// Delay to use after `current` if the next attempt also fails
    pub fn next_delay(&self, current: Duration) -> Duration {
        (current * 2).min(self.max_delay).max(self.initial_delay)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::flat(Duration::from_secs(5))
    }
}

/// Static parameters of the upstream session
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Instrument to subscribe, e.g. `OANDA:XAUUSD`
    pub symbol: String,
    /// Language and country sent with the locale command
    pub locale: (String, String),
    pub reconnect: ReconnectPolicy,
}

impl FeedSettings {
    pub fn from_config(config: &FeedConfig) -> Self {
        let initial = Duration::from_secs(config.reconnect_delay_secs);
        Self {
            symbol: config.symbol.clone(),
            locale: config.locale.clone(),
            reconnect: ReconnectPolicy {
                initial_delay: initial,
                max_delay: Duration::from_secs(config.max_reconnect_delay_secs).max(initial),
            },
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self::from_config(&FeedConfig::default())
    }
}

/// Single logical upstream connection plus the ingestion pipeline
pub struct FeedClient<T: FeedTransport> {
    transport: T,
    settings: FeedSettings,
    buffer: PriceBuffer,
    engine: SignalEngine,
    hub: BroadcastHub<Update>,
    state_tx: watch::Sender<ConnectionState>,
}

impl<T: FeedTransport> FeedClient<T> {
    pub fn new(
        transport: T,
        settings: FeedSettings,
        buffer: PriceBuffer,
        engine: SignalEngine,
        hub: BroadcastHub<Update>,
    ) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport,
            settings,
            buffer,
            engine,
            hub,
            state_tx,
        }
    }

    /// Watch connection state transitions
    pub fn state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    pub fn current_state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    pub fn buffer(&self) -> &PriceBuffer {
        &self.buffer
    }

    /// Run the connection state machine for the lifetime of the process.
    ///
    /// Every transport failure leads to RECONNECT_WAIT and another attempt;
    /// this future never completes.
    pub async fn run(mut self) {
        let policy = self.settings.reconnect;
        let mut delay = policy.initial_delay;
        let mut attempt: u32 = 0;

        loop {
            match self.run_session().await {
                Ok(()) => tracing::warn!("Upstream closed the connection"),
                Err(e) => tracing::warn!(error = %e, "Upstream connection lost"),
            }

            if self.current_state() == ConnectionState::Open {
                delay = policy.initial_delay;
                attempt = 0;
            }
            attempt += 1;

            self.set_state(ConnectionState::ReconnectWait);
            increment_counter(CounterMetric::Reconnects, 1);
            tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Reconnecting to upstream feed"
            );

            tokio::time::sleep(delay).await;
            delay = policy.next_delay(delay);
        }
    }

    /// One connect/handshake/stream cycle.
    ///
    /// Returns `Ok(())` when the remote closes cleanly and an error for any
    /// transport or handshake failure.
    pub async fn run_session(&mut self) -> Result<(), FeedError> {
        self.set_state(ConnectionState::Connecting);
        let mut conn = self.transport.connect().await?;

        self.set_state(ConnectionState::Open);
        self.handshake(&mut conn).await?;

        while let Some(msg) = conn.recv().await {
            match msg? {
                WsMessage::Text(text) => self.handle_batch(&mut conn, &text).await?,
                WsMessage::Binary(data) => {
                    tracing::trace!(len = data.len(), "Ignoring binary message");
                }
            }
        }

        Ok(())
    }

    async fn handshake(&self, conn: &mut T::Connection) -> Result<(), FeedError> {
        let session = QuoteSession::generate();
        let frames = handshake_frames(&session, &self.settings.symbol, &self.settings.locale);

        for frame in frames {
            conn.send(frame).await.map_err(FeedError::Handshake)?;
        }

        tracing::info!(
            symbol = %self.settings.symbol,
            session = %session,
            "Subscribed to upstream quotes"
        );
        Ok(())
    }

    /// Process one inbound text batch.
    ///
    /// Heartbeats are echoed, quote deltas are ingested and published, all
    /// other payloads are ignored. Only a failed heartbeat echo is an error.
    pub async fn handle_batch(
        &mut self,
        conn: &mut T::Connection,
        text: &str,
    ) -> Result<(), WsError> {
        for payload in FrameCodec::decode(text) {
            if let Some(token) = payload.heartbeat() {
                tracing::trace!(token, "Echoing heartbeat");
                conn.send(FrameCodec::encode(token)).await?;
            } else if let Some(quote) = payload.as_json().and_then(extract_quote) {
                self.handle_quote(PriceSample::now(quote.price)).await;
            }
        }
        Ok(())
    }

    /// Ingest one sample and publish the resulting update
    pub async fn handle_quote(&mut self, sample: PriceSample) -> PublishReport {
        let update = self.ingest(sample);
        let report = self.hub.publish(update).await;

        tracing::info!(
            price = update.price,
            signal = %update.signal,
            confidence = update.confidence,
            clients = report.delivered,
            "Published update"
        );
        report
    }

    /// Append a sample and score the resulting window
    pub fn ingest(&mut self, sample: PriceSample) -> Update {
        self.buffer.push(sample);

        let started = Instant::now();
        let evaluation = self.engine.evaluate(&self.buffer.prices());
        record_latency(LatencyMetric::SignalEvaluation, started.elapsed());

        increment_counter(CounterMetric::Quotes, 1);
        set_gauge(GaugeMetric::LastPrice, sample.price);
        set_gauge(GaugeMetric::LastConfidence, evaluation.confidence);

        Update::new(sample.price, evaluation)
    }

    fn set_state(&self, state: ConnectionState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            tracing::debug!(from = %previous, to = %state, "Feed state changed");
        }
    }
}
