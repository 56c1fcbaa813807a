//! `~m~` frame encoding and decoding

use crate::telemetry::{increment_counter, CounterMetric};
use serde_json::Value;

/// Delimiter that opens both the length header and the payload of a frame
pub const FRAME_DELIMITER: &str = "~m~";

/// Prefix of upstream heartbeat tokens (e.g. `~h~12`)
const HEARTBEAT_PREFIX: &str = "~h~";

/// A single decoded frame payload
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Non-JSON control token (heartbeats, session markers)
    Control(String),
    /// Parsed JSON document
    Json(Value),
}

impl Payload {
    /// Returns the raw token if this payload is an upstream heartbeat
    pub fn heartbeat(&self) -> Option<&str> {
        match self {
            Payload::Control(token) if token.starts_with(HEARTBEAT_PREFIX) => Some(token),
            _ => None,
        }
    }

    /// Returns the JSON document, if any
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Control(_) => None,
        }
    }
}

/// Stateless codec for the multiplexed text framing
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// Wrap a payload in a frame. The length is the UTF-8 byte length.
    pub fn encode(payload: &str) -> String {
        format!(
            "{}{}{}{}",
            FRAME_DELIMITER,
            payload.len(),
            FRAME_DELIMITER,
            payload
        )
    }

    /// Split a raw batch into its frame payloads, in arrival order.
    ///
    /// Declared lengths are honoured. A frame with a missing, non-numeric or
    /// overrunning length header is recovered by treating everything up to the
    /// next delimiter as its payload, so one corrupt header never loses the
    /// frames behind it.
    pub fn split(raw: &str) -> Vec<&str> {
        let mut frames = Vec::new();
        let mut rest = raw;

        while !rest.is_empty() {
            let Some(after_open) = rest.strip_prefix(FRAME_DELIMITER) else {
                // Garbage before the next frame: resynchronise on the delimiter
                match rest.find(FRAME_DELIMITER) {
                    Some(idx) => {
                        tracing::debug!(skipped = idx, "Skipping bytes outside a frame");
                        rest = &rest[idx..];
                        continue;
                    }
                    None => {
                        tracing::debug!(skipped = rest.len(), "Trailing bytes outside a frame");
                        break;
                    }
                }
            };

            let Some(header_end) = after_open.find(FRAME_DELIMITER) else {
                tracing::debug!("Frame header without payload delimiter");
                break;
            };

            let header = &after_open[..header_end];
            let body = &after_open[header_end + FRAME_DELIMITER.len()..];

            match header.parse::<usize>() {
                Ok(len) if len <= body.len() && body.is_char_boundary(len) => {
                    frames.push(&body[..len]);
                    rest = &body[len..];
                }
                _ => {
                    let end = body.find(FRAME_DELIMITER).unwrap_or(body.len());
                    tracing::debug!(header, "Invalid frame length, splitting on delimiter");
                    frames.push(&body[..end]);
                    rest = &body[end..];
                }
            }
        }

        frames
    }

    /// Decode a raw batch into payloads.
    ///
    /// Payloads starting with `{` are parsed as JSON; ones that fail to parse
    /// are dropped. Anything else is returned as a control token.
    pub fn decode(raw: &str) -> Vec<Payload> {
        Self::split(raw)
            .into_iter()
            .filter(|frame| !frame.is_empty())
            .filter_map(Self::decode_payload)
            .collect()
    }

    fn decode_payload(frame: &str) -> Option<Payload> {
        if !frame.starts_with('{') {
            return Some(Payload::Control(frame.to_string()));
        }

        match serde_json::from_str(frame) {
            Ok(value) => Some(Payload::Json(value)),
            Err(e) => {
                increment_counter(CounterMetric::FramesDropped, 1);
                tracing::debug!(error = %e, len = frame.len(), "Dropping malformed JSON frame");
                None
            }
        }
    }
}
