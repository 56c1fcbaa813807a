//! Price feed module
//!
//! Live quotes from the upstream market-data WebSocket, the rolling price
//! window, and the connection state machine that drives both.

mod buffer;
mod client;
mod types;

pub use buffer::{PriceBuffer, DEFAULT_CAPACITY};
pub use client::{FeedClient, FeedError, FeedSettings, ReconnectPolicy};
pub use types::{ConnectionState, PriceSample};
