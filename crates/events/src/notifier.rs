//! Post-mutation event emission with the per-screen / tenant-wide rule.
//!
//! A tenant-wide operation ("set company default", "assign to all company
//! screens") emits exactly one broadcast event per tenant instead of one per
//! screen, keeping emission O(tenants) for what is semantically a single
//! tenant-level change. Operations that targeted specific screens emit one
//! event per screen so consumers can address them individually.

use std::sync::Arc;

use beamview_core::types::DbId;

use crate::bus::{ConfigChangeEvent, EventBus};

/// How the caller scoped the mutation that is being announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyScope {
    /// The caller targeted specific screens: one event per screen id.
    PerScreen,
    /// The operation was tenant-wide: a single broadcast event, no screen id.
    TenantWide,
}

/// Publishes [`ConfigChangeEvent`]s according to [`NotifyScope`].
pub struct ConfigChangeNotifier {
    bus: Arc<EventBus>,
}

impl ConfigChangeNotifier {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Emit the event(s) for one tenant bucket of an operation.
    ///
    /// `screen_ids` is only consulted in [`NotifyScope::PerScreen`] mode;
    /// a tenant-wide notification is a single event regardless of how many
    /// screens were touched.
    pub fn notify(
        &self,
        customer_id: DbId,
        screen_ids: &[DbId],
        content_version: &str,
        scope: NotifyScope,
    ) {
        match scope {
            NotifyScope::PerScreen => {
                for &screen_id in screen_ids {
                    self.bus.publish(ConfigChangeEvent::for_screen(
                        customer_id,
                        screen_id,
                        content_version,
                    ));
                }
                tracing::debug!(
                    customer_id,
                    count = screen_ids.len(),
                    "Published per-screen config change events"
                );
            }
            NotifyScope::TenantWide => {
                self.bus
                    .publish(ConfigChangeEvent::for_customer(customer_id, content_version));
                tracing::debug!(customer_id, "Published tenant-wide config change event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<ConfigChangeEvent>) -> Vec<ConfigChangeEvent> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[tokio::test]
    async fn per_screen_scope_emits_one_event_per_screen() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let notifier = ConfigChangeNotifier::new(bus);

        notifier.notify(5, &[10, 11, 12], "v2", NotifyScope::PerScreen);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 3);
        let ids: Vec<Option<DbId>> = events.iter().map(|e| e.screen_id).collect();
        assert_eq!(ids, vec![Some(10), Some(11), Some(12)]);
        assert!(events.iter().all(|e| e.customer_id == 5));
        assert!(events.iter().all(|e| e.content_version == "v2"));
    }

    #[tokio::test]
    async fn tenant_wide_scope_emits_exactly_one_broadcast() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let notifier = ConfigChangeNotifier::new(bus);

        notifier.notify(5, &[10, 11, 12], "v2", NotifyScope::TenantWide);

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].customer_id, 5);
        assert_eq!(events[0].screen_id, None);
        assert_eq!(events[0].content_version, "v2");
    }

    #[tokio::test]
    async fn per_screen_scope_with_empty_list_emits_nothing() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let notifier = ConfigChangeNotifier::new(bus);

        notifier.notify(5, &[], "v2", NotifyScope::PerScreen);

        assert!(drain(&mut rx).is_empty());
    }
}
