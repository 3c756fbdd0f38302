//! # chainlog-broadcast
//!
//! Best-effort fan-out of ledger events to live subscribers.
//!
//! [`SubscriberHub`] implements [`chainlog_core::traits::Notifier`]. Create
//! it once at startup, hand an `Arc` to the ledger, and call
//! [`SubscriberHub::shutdown`] on exit. Delivery never affects the outcome
//! of an append.

pub mod hub;

pub use hub::{SubscriberHub, SubscriberId, Subscription, DEFAULT_CAPACITY};

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use chainlog_contracts::{ChainEvent, ChainlogError, LinkedEntry, Tags};
    use chainlog_core::traits::Notifier;

    use super::SubscriberHub;

    fn event(id: u64) -> ChainEvent {
        let entry = LinkedEntry {
            author: "alice".to_string(),
            body: format!("entry {id}"),
            node_code: None,
            input_code: None,
            tags: Tags::new(),
            supersedes_id: None,
            prev_hash: None,
            curr_hash: "0f".repeat(32),
        }
        .into_entry(id, Utc::now());
        ChainEvent::Appended { entry }
    }

    #[test]
    fn test_broadcast_reaches_every_subscriber() {
        let hub = SubscriberHub::new();
        let a = hub.subscribe().unwrap();
        let b = hub.subscribe().unwrap();

        assert_eq!(hub.broadcast(&event(1)), 2);

        for sub in [&a, &b] {
            let message = sub.recv_timeout(Duration::from_secs(1)).unwrap();
            let json: serde_json::Value = serde_json::from_str(&message).unwrap();
            assert_eq!(json["type"], "appended");
            assert_eq!(json["entry"]["id"], 1);
        }
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hub = SubscriberHub::new();
        let sub = hub.subscribe().unwrap();

        assert!(hub.unsubscribe(sub.id()));
        assert!(!hub.unsubscribe(sub.id()));
        assert_eq!(hub.broadcast(&event(1)), 0);
        assert!(sub.try_recv().is_none());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let hub = SubscriberHub::new();
        let keep = hub.subscribe().unwrap();
        let gone = hub.subscribe().unwrap();
        drop(gone);

        assert_eq!(hub.broadcast(&event(1)), 1);
        assert_eq!(hub.subscriber_count(), 1);
        assert_eq!(keep.drain().len(), 1);
    }

    #[test]
    fn test_shutdown_disconnects_and_refuses_new_subscribers() {
        let hub = SubscriberHub::new();
        let sub = hub.subscribe().unwrap();
        hub.shutdown();

        assert_eq!(hub.subscriber_count(), 0);
        assert!(sub.recv_timeout(Duration::from_millis(10)).is_none());
        assert!(matches!(hub.subscribe(), Err(ChainlogError::SubscriptionClosed)));
    }

    #[test]
    fn test_notifier_impl_broadcasts() {
        let hub = SubscriberHub::new();
        let sub = hub.subscribe().unwrap();

        let notifier: &dyn Notifier = &hub;
        notifier.notify(&event(7));
        notifier.notify(&event(8));

        let messages = sub.drain();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].contains("\"id\":8"));
    }

    /// A subscriber that never drains caps out at the hub capacity and
    /// neither blocks the broadcaster nor starves other subscribers.
    #[test]
    fn test_stalled_subscriber_queue_is_bounded() {
        let hub = SubscriberHub::with_capacity(2);
        let stalled = hub.subscribe().unwrap();
        let active = hub.subscribe().unwrap();

        for id in 1..=3 {
            hub.broadcast(&event(id));
            assert_eq!(active.drain().len(), 1);
        }
        assert_eq!(hub.broadcast(&event(4)), 1);

        assert_eq!(hub.subscriber_count(), 2);
        let queued = stalled.drain();
        assert_eq!(queued.len(), 2);
        assert!(queued[0].contains("\"id\":1"));
        assert!(queued[1].contains("\"id\":2"));

        // Draining frees room for the next event.
        assert_eq!(hub.broadcast(&event(5)), 2);
        assert!(stalled.try_recv().unwrap().contains("\"id\":5"));
    }
}
