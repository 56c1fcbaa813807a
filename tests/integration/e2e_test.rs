//! End-to-end tests: scripted upstream -> feed client -> hub -> subscribers

mod support;

use futures_util::{SinkExt, StreamExt};
use goldfeed::broadcast::BroadcastHub;
use goldfeed::config::SignalConfig;
use goldfeed::feed::{ConnectionState, FeedClient, FeedSettings, PriceBuffer, ReconnectPolicy};
use goldfeed::server::{self, AppState};
use goldfeed::signal::{Direction, FixedScorer, Signal, SignalEngine, Update};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use support::{assert_handshake, connection, quote_frame, Remote, ScriptedTransport};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

const PRICES: [f64; 10] = [
    100.0, 101.0, 99.0, 102.0, 103.0, 101.0, 104.0, 105.0, 103.0, 106.0,
];

struct Pipeline {
    hub: BroadcastHub<Update>,
    state: watch::Receiver<ConnectionState>,
    remote: Remote,
    task: JoinHandle<()>,
}

/// Start a feed client with a fixed scorer and complete its handshake
async fn start_pipeline(probability: f64) -> Pipeline {
    let (transport, connector) = ScriptedTransport::new();
    let hub = BroadcastHub::new(64);
    let engine = SignalEngine::new(Arc::new(FixedScorer(probability)), &SignalConfig::default());
    let settings = FeedSettings {
        reconnect: ReconnectPolicy::flat(Duration::from_secs(5)),
        ..FeedSettings::default()
    };
    let client = FeedClient::new(transport, settings, PriceBuffer::new(30), engine, hub.clone());
    let state = client.state();
    let task = tokio::spawn(client.run());

    let (conn, mut remote) = connection();
    connector.send(Ok(conn)).unwrap();
    assert_handshake(&remote.sent(4).await, "OANDA:XAUUSD");

    Pipeline {
        hub,
        state,
        remote,
        task,
    }
}

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn test_ten_prices_produce_hold_then_buy() {
    let pipeline = start_pipeline(0.9).await;
    let mut first = pipeline.hub.subscribe().await;
    let mut second = pipeline.hub.subscribe().await;

    for price in PRICES {
        pipeline.remote.push_text(quote_frame(price));
    }

    for sub in [&mut first, &mut second] {
        let mut updates = Vec::new();
        for _ in 0..PRICES.len() {
            updates.push(sub.recv().await.unwrap());
        }

        let prices: Vec<f64> = updates.iter().map(|u| u.price).collect();
        assert_eq!(prices, PRICES.to_vec());

        for update in &updates[..9] {
            assert_eq!(update.signal, Signal::Hold);
            assert_eq!(update.direction, Direction::Hold);
            assert_eq!(update.confidence, 50.0);
            assert!(update.levels.is_none());
        }

        let last = updates[9];
        assert_eq!(last.signal, Signal::Buy);
        assert_eq!(last.direction, Direction::Up);
        assert_eq!(last.confidence, 80.0);
        let levels = last.levels.unwrap();
        assert!((levels.tp1 - 110.8).abs() < 1e-9);
        assert!((levels.tp2 - 115.6).abs() < 1e-9);
        assert!((levels.tp3 - 122.0).abs() < 1e-9);
        assert!((levels.sl - 99.6).abs() < 1e-9);
    }

    pipeline.task.abort();
}

#[tokio::test]
async fn test_late_subscriber_only_sees_later_updates() {
    let pipeline = start_pipeline(0.5).await;
    let mut early = pipeline.hub.subscribe().await;

    pipeline.remote.push_text(quote_frame(2350.0));
    assert_eq!(early.recv().await.map(|u| u.price), Some(2350.0));

    let mut late = pipeline.hub.subscribe().await;
    pipeline.remote.push_text(quote_frame(2351.0));

    assert_eq!(early.recv().await.map(|u| u.price), Some(2351.0));
    assert_eq!(late.recv().await.map(|u| u.price), Some(2351.0));
    assert!(late.try_recv().is_none());

    pipeline.task.abort();
}

#[tokio::test]
async fn test_disconnected_subscriber_is_pruned() {
    let pipeline = start_pipeline(0.5).await;
    let mut subs = Vec::new();
    for _ in 0..5 {
        subs.push(pipeline.hub.subscribe().await);
    }
    let dropped = subs.remove(2);
    let dropped_id = dropped.id();
    drop(dropped);

    pipeline.remote.push_text(quote_frame(2400.0));
    for sub in &mut subs {
        assert_eq!(sub.recv().await.map(|u| u.price), Some(2400.0));
    }

    assert_eq!(pipeline.hub.len().await, 4);
    assert!(!pipeline.hub.contains(dropped_id).await);
    // removing an already pruned subscriber is a no-op
    assert!(!pipeline.hub.unsubscribe(dropped_id).await);
    assert_eq!(pipeline.hub.len().await, 4);

    pipeline.task.abort();
}

#[tokio::test]
async fn test_websocket_subscriber_receives_json_updates() {
    let pipeline = start_pipeline(0.5).await;
    let app = AppState {
        hub: pipeline.hub.clone(),
        feed_state: pipeline.state.clone(),
        send_timeout: Duration::from_secs(5),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_task = tokio::spawn(server::serve(listener, app, std::future::pending()));

    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .unwrap();
    eventually(|| {
        let hub = pipeline.hub.clone();
        async move { hub.len().await == 1 }
    })
    .await;

    pipeline.remote.push_text(quote_frame(2377.25));
    let text = match ws.next().await {
        Some(Ok(Message::Text(text))) => text,
        other => panic!("expected text update, got {other:?}"),
    };
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["price"], 2377.25);
    assert_eq!(value["signal"], "HOLD");
    assert_eq!(value["direction"], "HOLD");
    assert_eq!(value["confidence"], 50.0);

    // application-level keepalive
    ws.send(Message::Text("ping".to_string())).await.unwrap();
    match ws.next().await {
        Some(Ok(Message::Text(text))) => assert_eq!(text, "pong"),
        other => panic!("expected pong, got {other:?}"),
    }

    let health = get_health(addr).await;
    assert!(health.contains(r#""feed":"open""#), "{health}");
    assert!(health.contains(r#""subscribers":1"#), "{health}");

    ws.close(None).await.unwrap();
    eventually(|| {
        let hub = pipeline.hub.clone();
        async move { hub.is_empty().await }
    })
    .await;

    server_task.abort();
    pipeline.task.abort();
}

async fn get_health(addr: std::net::SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    response
}
