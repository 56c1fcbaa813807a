//! Run command implementation

use crate::broadcast::BroadcastHub;
use crate::config::Config;
use crate::feed::{FeedClient, FeedSettings, PriceBuffer};
use crate::server::{self, AppState};
use crate::signal::{LogisticScorer, Scorer, SignalEngine};
use crate::ws::{WsClient, WsConfig};
use anyhow::Context;
use clap::Args;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Instrument to subscribe, overriding the configuration
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Address for the subscriber server, overriding the configuration
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}

impl RunArgs {
    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        if let Some(ref symbol) = self.symbol {
            config.feed.symbol = symbol.clone();
        }
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        config.validate()?;

        // Built once, shared read-only by the ingestion path
        let scorer: Arc<dyn Scorer> = Arc::new(LogisticScorer::from_config(&config.signal.scorer));
        let engine = SignalEngine::new(scorer, &config.signal);
        tracing::info!(?engine, "Signal engine ready");

        let hub = BroadcastHub::new(config.broadcast.queue_capacity);
        let client = FeedClient::new(
            WsClient::new(WsConfig::from_feed(&config.feed)),
            FeedSettings::from_config(&config.feed),
            PriceBuffer::new(config.buffer.capacity),
            engine,
            hub.clone(),
        );

        let state = AppState {
            hub,
            feed_state: client.state(),
            send_timeout: Duration::from_millis(config.broadcast.send_timeout_ms),
        };

        let listener = TcpListener::bind(config.server.bind)
            .await
            .with_context(|| format!("binding {}", config.server.bind))?;

        tracing::info!(symbol = %config.feed.symbol, "Starting feed client");
        let feed_task = tokio::spawn(client.run());

        let result = server::serve(listener, state, shutdown_signal()).await;

        feed_task.abort();
        tracing::info!("Shut down");
        result
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Ctrl-C received, shutting down");
}
