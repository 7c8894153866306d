//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`ConfigChangeEvent`]s.
//! It is designed to be shared via `Arc<EventBus>` across the application;
//! the live-update channel layer subscribes and relays events to connected
//! dashboards/screens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use beamview_core::types::DbId;

// ---------------------------------------------------------------------------
// ConfigChangeEvent
// ---------------------------------------------------------------------------

/// Notification that a screen's effective configuration changed.
///
/// `screen_id = None` means "all of this customer's screens should treat
/// their config as changed" — one event stands in for the whole fleet.
/// Events are transient: consumed from the bus, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigChangeEvent {
    pub customer_id: DbId,

    /// Target screen, or `None` for a tenant-wide broadcast.
    pub screen_id: Option<DbId>,

    /// Content-version hint for consumers that short-circuit on equality.
    /// Empty when the operation has no single version (e.g. clearing
    /// overrides across tenants).
    pub content_version: String,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ConfigChangeEvent {
    /// Event addressed to a single screen.
    pub fn for_screen(customer_id: DbId, screen_id: DbId, content_version: impl Into<String>) -> Self {
        Self {
            customer_id,
            screen_id: Some(screen_id),
            content_version: content_version.into(),
            timestamp: Utc::now(),
        }
    }

    /// Tenant-wide event covering every screen of the customer.
    pub fn for_customer(customer_id: DbId, content_version: impl Into<String>) -> Self {
        Self {
            customer_id,
            screen_id: None,
            content_version: content_version.into(),
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`ConfigChangeEvent`].
pub struct EventBus {
    sender: broadcast::Sender<ConfigChangeEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped;
    /// devices self-heal via polling, so a missed event is not a data loss.
    pub fn publish(&self, event: ConfigChangeEvent) {
        // Ignore the SendError — it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ConfigChangeEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(ConfigChangeEvent::for_screen(3, 42, "sha256:abc"));

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.customer_id, 3);
        assert_eq!(received.screen_id, Some(42));
        assert_eq!(received.content_version, "sha256:abc");
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_event() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(ConfigChangeEvent::for_customer(7, "v1"));

        let e1 = rx1.recv().await.expect("subscriber 1 should receive");
        let e2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(e1.customer_id, 7);
        assert!(e1.screen_id.is_none());
        assert_eq!(e2.content_version, "v1");
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers — this must not panic.
        bus.publish(ConfigChangeEvent::for_customer(1, ""));
    }
}
