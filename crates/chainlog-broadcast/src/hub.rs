//! Subscriber registry with best-effort fan-out.
//!
//! A `SubscriberHub` is created once at startup and shared by `Arc`. Each
//! subscriber owns the receiving half of a bounded channel; the hub keeps
//! the sending halves keyed by a random id. Broadcasting serializes the
//! event once and pushes the same text to every live subscriber without
//! blocking. A subscriber whose queue is full misses that event. A
//! subscriber whose receiver has been dropped is pruned on the next
//! broadcast.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError, TrySendError};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use chainlog_contracts::{ChainEvent, ChainlogError, ChainlogResult};
use chainlog_core::traits::Notifier;

/// Identifies one subscription within a hub.
pub type SubscriberId = Uuid;

/// Events a subscriber may have queued before further ones are dropped.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Default)]
struct HubState {
    subscribers: HashMap<SubscriberId, SyncSender<String>>,
    closed: bool,
}

/// The process-wide registry of event subscribers.
pub struct SubscriberHub {
    state: Mutex<HubState>,
    capacity: usize,
}

/// The receiving side of one subscription.
///
/// Messages are JSON-encoded `ChainEvent`s. Once the hub shuts down or the
/// subscription is removed, receives report disconnection.
pub struct Subscription {
    id: SubscriberId,
    receiver: Receiver<String>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next message if one is queued, `None` when empty or disconnected.
    pub fn try_recv(&self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<String> {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => Some(message),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain every queued message without blocking.
    pub fn drain(&self) -> Vec<String> {
        self.receiver.try_iter().collect()
    }
}

impl SubscriberHub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// A hub whose subscribers each queue at most `capacity` events.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(HubState::default()),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        // Poisoning is ignored: the state is only a sender map and a flag.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a new subscriber.
    ///
    /// Returns `SubscriptionClosed` after `shutdown`.
    pub fn subscribe(&self) -> ChainlogResult<Subscription> {
        let mut state = self.lock();
        if state.closed {
            return Err(ChainlogError::SubscriptionClosed);
        }

        let (sender, receiver) = mpsc::sync_channel(self.capacity);
        let id = Uuid::new_v4();
        state.subscribers.insert(id, sender);

        debug!(subscriber = %id, active = state.subscribers.len(), "subscriber added");
        Ok(Subscription { id, receiver })
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.lock().subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Deliver `event` to every subscriber; returns how many received it.
    ///
    /// Never blocks. A subscriber with a full queue misses this event and
    /// stays registered. Subscribers whose receiver is gone are dropped
    /// from the registry.
    pub fn broadcast(&self, event: &ChainEvent) -> usize {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "failed to encode event; nothing broadcast");
                return 0;
            }
        };

        let mut state = self.lock();
        let mut delivered = 0;
        let mut lagging = 0;
        let mut dead = Vec::new();
        for (id, sender) in &state.subscribers {
            match sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    lagging += 1;
                    warn!(subscriber = %id, capacity = self.capacity, "subscriber queue full; event dropped");
                }
                Err(TrySendError::Disconnected(_)) => dead.push(*id),
            }
        }
        for id in &dead {
            state.subscribers.remove(id);
            debug!(subscriber = %id, "dropped disconnected subscriber");
        }

        debug!(delivered, lagging, pruned = dead.len(), "event broadcast");
        delivered
    }

    /// Close the hub: drop every subscriber and refuse new ones.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        let count = state.subscribers.len();
        state.subscribers.clear();
        state.closed = true;
        info!(disconnected = count, "subscriber hub shut down");
    }
}

impl Default for SubscriberHub {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for SubscriberHub {
    fn notify(&self, event: &ChainEvent) {
        self.broadcast(event);
    }
}
