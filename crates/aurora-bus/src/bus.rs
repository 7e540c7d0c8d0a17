//! Message bus implementation.
//!
//! A registry of unbounded senders keyed by subscriber id. The guard-based
//! subscription keeps registration and deregistration on the same identity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;
use tracing::{debug, trace};

struct BusInner<T> {
    subscribers: Mutex<HashMap<u64, mpsc::UnboundedSender<T>>>,
    next_id: AtomicU64,
}

/// Fire-and-forget message bus.
///
/// Cheap to clone; clones share the same subscriber registry.
pub struct MessageBus<T> {
    inner: Arc<BusInner<T>>,
}

impl<T> Clone for MessageBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for MessageBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MessageBus<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().unwrap().len()
    }
}

impl<T: Clone> MessageBus<T> {
    /// Publish a message to every subscriber.
    ///
    /// Never fails: with no subscribers the message is dropped, and
    /// subscribers whose receiver is gone are pruned from the registry.
    pub fn publish(&self, message: T) {
        let mut subscribers = self.inner.subscribers.lock().unwrap();
        let mut dead = Vec::new();

        for (id, tx) in subscribers.iter() {
            if tx.send(message.clone()).is_err() {
                dead.push(*id);
            }
        }

        for id in dead {
            trace!(subscriber = id, "Pruning closed subscriber");
            subscribers.remove(&id);
        }
    }

    /// Register a subscriber and return its guard.
    pub fn subscribe(&self) -> Subscription<T> {
        let id = self.inner.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.subscribers.lock().unwrap().insert(id, tx);
        debug!(subscriber = id, "Registered bus subscriber");

        Subscription {
            id,
            rx,
            bus: Arc::downgrade(&self.inner),
        }
    }
}

/// Subscription guard.
///
/// Holds the receiving end of the channel and the id under which the sender
/// was registered. Dropping the guard removes exactly that registration.
pub struct Subscription<T> {
    id: u64,
    rx: mpsc::UnboundedReceiver<T>,
    bus: Weak<BusInner<T>>,
}

impl<T> Subscription<T> {
    /// Subscriber id this guard was registered under.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Receive the next message, or `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Non-blocking receive.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            inner.subscribers.lock().unwrap().remove(&self.id);
            debug!(subscriber = self.id, "Detached bus subscriber");
        }
    }
}
