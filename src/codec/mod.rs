//! Upstream wire codec
//!
//! The quote feed multiplexes control tokens and JSON documents over a single
//! text stream, each wrapped as `~m~<len>~m~<payload>`.

mod frame;
mod quote;
mod session;

pub use frame::{FrameCodec, Payload, FRAME_DELIMITER};
pub use quote::{extract_quote, QuoteDelta, QUOTE_DELTA_METHOD};
pub use session::{handshake_frames, QuoteSession, HELLO_TOKEN};
