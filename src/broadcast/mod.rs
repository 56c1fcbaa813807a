//! Subscriber fan-out
//!
//! Every published item is offered to each registered subscriber's bounded
//! relay queue. Subscribers whose queue is closed or full are pruned.

mod hub;
mod subscriber;

pub use hub::{BroadcastHub, PublishReport, DEFAULT_QUEUE_CAPACITY};
pub use subscriber::{Subscriber, SubscriberId};
