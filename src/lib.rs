//! goldfeed: live gold quote signals fanned out to WebSocket subscribers
//!
//! This library provides the core components for:
//! - Decoding the upstream `~m~<len>~m~<payload>` quote protocol
//! - A resilient, auto-reconnecting upstream feed client
//! - A rolling price window feeding a pluggable signal scorer
//! - A broadcast hub that fans updates out and prunes dead subscribers
//! - A WebSocket subscriber server, configuration and observability

pub mod broadcast;
pub mod cli;
pub mod codec;
pub mod config;
pub mod feed;
pub mod server;
pub mod signal;
pub mod telemetry;
pub mod ws;
