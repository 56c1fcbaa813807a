//! Subscriber handle

use tokio::sync::mpsc;

/// Lifecycle token identifying one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(pub(crate) u64);

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receiving end of a subscription.
///
/// Dropping it closes the relay queue; the hub prunes the subscriber on the
/// next publish.
#[derive(Debug)]
pub struct Subscriber<T> {
    id: SubscriberId,
    rx: mpsc::Receiver<T>,
}

impl<T> Subscriber<T> {
    pub(crate) fn new(id: SubscriberId, rx: mpsc::Receiver<T>) -> Self {
        Self { id, rx }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next item. `None` once the hub has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take the next queued item without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}
