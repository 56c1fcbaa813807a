//! Integration tests for the upstream wire codec

mod support;

use goldfeed::codec::{extract_quote, handshake_frames, FrameCodec, Payload, QuoteSession};
use serde_json::json;
use support::{assert_handshake, quote_frame};

fn quotes(raw: &str) -> Vec<f64> {
    FrameCodec::decode(raw)
        .iter()
        .filter_map(Payload::as_json)
        .filter_map(extract_quote)
        .map(|q| q.price)
        .collect()
}

#[test]
fn test_encode_then_decode_preserves_payloads() {
    let docs = [
        json!({"m": "set_auth_token", "p": ["unauthorized_user_token"]}),
        json!({"m": "note", "p": ["contains ~m~ inside a string"]}),
        json!({"m": "note", "p": ["ünïcödé €"]}),
    ];
    let raw: String = docs
        .iter()
        .map(|d| FrameCodec::encode(&d.to_string()))
        .collect();

    let decoded: Vec<_> = FrameCodec::decode(&raw)
        .into_iter()
        .filter_map(|p| p.as_json().cloned())
        .collect();
    assert_eq!(decoded, docs.to_vec());
}

#[test]
fn test_malformed_frame_between_quotes() {
    let raw = format!(
        "{}{}{}",
        quote_frame(2350.5),
        FrameCodec::encode(r#"{"m":"qsd","p":["qs_x",{"n":"#),
        quote_frame(2351.75)
    );
    assert_eq!(quotes(&raw), vec![2350.5, 2351.75]);
}

#[test]
fn test_corrupt_length_header_does_not_lose_following_quote() {
    let raw = format!("~m~abc~m~~h~5{}", quote_frame(1999.0));
    let payloads = FrameCodec::decode(&raw);
    assert_eq!(payloads[0].heartbeat(), Some("~h~5"));
    assert_eq!(quotes(&raw), vec![1999.0]);
}

#[test]
fn test_mixed_session_batch() {
    let raw = [
        FrameCodec::encode(r#"{"session_id":"<0.17.1>","timestamp":1700000000}"#),
        FrameCodec::encode("~h~1"),
        FrameCodec::encode(r#"{"m":"quote_completed","p":["qs_x","OANDA:XAUUSD"]}"#),
        FrameCodec::encode(r#"{"m":"qsd","p":["qs_x",{"n":"OANDA:XAUUSD","v":{"ch":1.2}}]}"#),
        quote_frame(2400.1),
    ]
    .concat();

    let payloads = FrameCodec::decode(&raw);
    assert_eq!(payloads.len(), 5);
    assert_eq!(payloads.iter().filter(|p| p.heartbeat().is_some()).count(), 1);
    assert_eq!(quotes(&raw), vec![2400.1]);
}

#[test]
fn test_handshake_frames_decode_in_order() {
    let session = QuoteSession::generate();
    let frames = handshake_frames(
        &session,
        "OANDA:XAUUSD",
        &("en".to_string(), "US".to_string()),
    );

    let id = assert_handshake(&frames, "OANDA:XAUUSD");
    assert_eq!(id, session.as_str());

    let locale = FrameCodec::decode(&frames[1]);
    assert_eq!(locale[0], Payload::Json(json!({"m": "set_locale", "p": ["en", "US"]})));
}
