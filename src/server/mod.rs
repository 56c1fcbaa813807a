//! Subscriber server
//!
//! `GET /ws` registers a broadcast subscriber per WebSocket connection and
//! relays its updates as JSON text. `GET /health` reports the upstream state
//! and the subscriber count.

use crate::broadcast::{BroadcastHub, Subscriber};
use crate::feed::ConnectionState;
use crate::signal::Update;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Shared state for the subscriber routes
#[derive(Clone)]
pub struct AppState {
    pub hub: BroadcastHub<Update>,
    pub feed_state: watch::Receiver<ConnectionState>,
    /// Per-message send timeout towards a subscriber socket
    pub send_timeout: Duration,
}

/// Body of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub feed: ConnectionState,
    pub subscribers: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websocket_handler))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the subscriber routes until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "Subscriber server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let feed = *state.feed_state.borrow();
    Json(HealthResponse {
        feed,
        subscribers: state.hub.len().await,
    })
}

async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let mut subscriber = state.hub.subscribe().await;
    let id = subscriber.id();
    tracing::info!(subscriber = %id, "Subscriber connected");

    relay(socket, &mut subscriber, state.send_timeout).await;

    state.hub.unsubscribe(id).await;
    tracing::info!(subscriber = %id, "Subscriber disconnected");
}

/// Forward queued updates to the socket until either side goes away
async fn relay(mut socket: WebSocket, subscriber: &mut Subscriber<Update>, send_timeout: Duration) {
    loop {
        tokio::select! {
            update = subscriber.recv() => {
                // None: the hub pruned this subscriber
                let Some(update) = update else { break };
                let text = match serde_json::to_string(&update) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to serialize update");
                        continue;
                    }
                };
                match tokio::time::timeout(send_timeout, socket.send(Message::Text(text))).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        tracing::debug!(error = %e, "Subscriber send failed");
                        break;
                    }
                    Err(_) => {
                        tracing::warn!(timeout_ms = send_timeout.as_millis() as u64, "Subscriber send timed out");
                        break;
                    }
                }
            }

            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) if text.trim() == "ping" => {
                        if socket.send(Message::Text("pong".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}
