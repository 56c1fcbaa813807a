//! Broadcast hub with self-pruning membership

use super::{Subscriber, SubscriberId};
use crate::telemetry::{increment_counter, set_gauge, CounterMetric, GaugeMetric};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;

/// Default per-subscriber relay queue depth
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Outcome of one publish call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Subscribers the item was queued for
    pub delivered: usize,
    /// Subscribers removed because delivery failed
    pub pruned: usize,
}

struct Members<T> {
    next_id: u64,
    // Keyed by a monotonically increasing id, so iteration is join order
    senders: BTreeMap<SubscriberId, mpsc::Sender<T>>,
}

/// Shared handle to the subscriber set
pub struct BroadcastHub<T> {
    members: Arc<Mutex<Members<T>>>,
    queue_capacity: usize,
}

impl<T> Clone for BroadcastHub<T> {
    fn clone(&self) -> Self {
        Self {
            members: Arc::clone(&self.members),
            queue_capacity: self.queue_capacity,
        }
    }
}

impl<T: Clone + Send + 'static> BroadcastHub<T> {
    /// Create a hub whose subscribers each get a queue of `queue_capacity`
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            members: Arc::new(Mutex::new(Members {
                next_id: 0,
                senders: BTreeMap::new(),
            })),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new subscriber. Items published earlier are not replayed.
    pub async fn subscribe(&self) -> Subscriber<T> {
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let mut members = self.members.lock().await;

        let id = SubscriberId(members.next_id);
        members.next_id += 1;
        members.senders.insert(id, tx);
        set_gauge(GaugeMetric::Subscribers, members.senders.len() as f64);

        tracing::debug!(subscriber = %id, total = members.senders.len(), "Subscriber joined");
        Subscriber::new(id, rx)
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut members = self.members.lock().await;
        let removed = members.senders.remove(&id).is_some();
        if removed {
            set_gauge(GaugeMetric::Subscribers, members.senders.len() as f64);
            tracing::debug!(subscriber = %id, total = members.senders.len(), "Subscriber left");
        }
        removed
    }

    /// Offer `item` to every current subscriber.
    ///
    /// Delivery never waits on a subscriber: each item is queued with
    /// `try_send`. A closed or full queue counts as a failed delivery and the
    /// subscriber is removed before this call returns.
    pub async fn publish(&self, item: T) -> PublishReport {
        let mut members = self.members.lock().await;
        let mut report = PublishReport::default();
        let mut failed = Vec::new();

        for (id, tx) in members.senders.iter() {
            match tx.try_send(item.clone()) {
                Ok(()) => report.delivered += 1,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(subscriber = %id, "Subscriber queue full, dropping subscriber");
                    failed.push(*id);
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(subscriber = %id, "Subscriber closed, pruning");
                    failed.push(*id);
                }
            }
        }

        for id in &failed {
            members.senders.remove(id);
        }
        report.pruned = failed.len();

        if report.pruned > 0 {
            increment_counter(CounterMetric::SubscribersPruned, report.pruned as u64);
            set_gauge(GaugeMetric::Subscribers, members.senders.len() as f64);
        }

        report
    }

    /// Number of registered subscribers
    pub async fn len(&self) -> usize {
        self.members.lock().await.senders.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.members.lock().await.senders.is_empty()
    }

    pub async fn contains(&self, id: SubscriberId) -> bool {
        self.members.lock().await.senders.contains_key(&id)
    }

    /// Current membership in join order
    pub async fn subscriber_ids(&self) -> Vec<SubscriberId> {
        self.members.lock().await.senders.keys().copied().collect()
    }
}
