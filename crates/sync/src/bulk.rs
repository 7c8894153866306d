//! Bulk playlist assignment over bounded-size batches.
//!
//! A tenant-wide or platform-wide assignment can touch an unbounded number
//! of screens, so the engine pages through the scope by ascending id and
//! never materializes the full result set; only aggregated bookkeeping
//! (affected ids, per-tenant buckets, skips) is carried between pages.
//!
//! After the writes, affected screens are bumped through the push fanout
//! and exactly the right events are emitted: one per tenant for tenant-wide
//! scopes, one per screen when the caller targeted an explicit id list.
//! Push failures are reported, never escalated — the store writes already
//! committed and devices self-heal via polling.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use beamview_core::error::CoreError;
use beamview_core::store::{Playlist, PlaylistStore, ScreenScope};
use beamview_core::types::DbId;
use beamview_events::{ConfigChangeNotifier, NotifyScope};
use beamview_push::PushFanoutService;

/// Rows fetched per page.
const DEFAULT_BATCH_SIZE: i64 = 200;

/// A screen the engine refused to touch, with the reason it was excluded.
#[derive(Debug, serde::Serialize)]
pub struct SkippedScreen {
    pub screen_id: DbId,
    pub reason: String,
}

/// Result of one bulk assignment run.
#[derive(Debug, Default)]
pub struct AssignmentOutcome {
    /// Screens whose override actually changed, in processing order.
    pub affected_ids: Vec<DbId>,
    /// Affected ids grouped per tenant (deterministic iteration order).
    pub by_customer: BTreeMap<DbId, Vec<DbId>>,
    /// Screens excluded from the write (scope violations, missing rows).
    pub skipped: Vec<SkippedScreen>,
    /// Screens whose bump notification failed. Informational only.
    pub push_failed: Vec<DbId>,
    /// Version carried in the emitted events; empty when clearing overrides.
    pub content_version: String,
}

/// Applies a playlist-assignment change across many screens.
pub struct BulkAssignmentEngine {
    store: Arc<dyn PlaylistStore>,
    fanout: Arc<PushFanoutService>,
    notifier: Arc<ConfigChangeNotifier>,
    batch_size: i64,
}

impl BulkAssignmentEngine {
    pub fn new(
        store: Arc<dyn PlaylistStore>,
        fanout: Arc<PushFanoutService>,
        notifier: Arc<ConfigChangeNotifier>,
    ) -> Self {
        Self {
            store,
            fanout,
            notifier,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the page size (must be >= 1). Used by tests to exercise the
    /// paging loop with small fixtures.
    pub fn with_batch_size(mut self, batch_size: i64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Apply `playlist_id` (or clear the override, when `None`) to every
    /// screen in `scope`, then bump and notify the affected screens.
    ///
    /// Per screen: a tenant mismatch is recorded in `skipped` and the batch
    /// continues; clearing counts a screen as affected only if it actually
    /// had an override, so re-running the same call converges to zero.
    ///
    /// Errors only on store failures or when `playlist_id` references a
    /// playlist that does not exist at all.
    pub async fn apply_assignment(
        &self,
        scope: ScreenScope,
        playlist_id: Option<DbId>,
    ) -> Result<AssignmentOutcome, CoreError> {
        let playlist: Option<Playlist> = match playlist_id {
            Some(id) => Some(self.store.find_playlist(id).await?.ok_or(
                CoreError::NotFound {
                    entity: "playlist",
                    id,
                },
            )?),
            None => None,
        };

        let mut outcome = AssignmentOutcome {
            content_version: playlist
                .as_ref()
                .map(|p| p.content_version.clone())
                .unwrap_or_default(),
            ..Default::default()
        };
        let mut seen: HashSet<DbId> = HashSet::new();

        let mut after_id: DbId = 0;
        loop {
            let page = self
                .store
                .list_screens_page(&scope, after_id, self.batch_size)
                .await?;
            if page.is_empty() {
                break;
            }

            for screen in &page {
                after_id = after_id.max(screen.id);
                seen.insert(screen.id);

                match &playlist {
                    Some(pl) => {
                        if screen.customer_id != pl.customer_id {
                            // Cross-tenant assignment is a contract
                            // violation for this row only.
                            tracing::warn!(
                                screen_id = screen.id,
                                playlist_id = pl.id,
                                "Skipping screen: playlist/customer mismatch"
                            );
                            outcome.skipped.push(SkippedScreen {
                                screen_id: screen.id,
                                reason: format!(
                                    "playlist {} does not belong to customer {}",
                                    pl.id, screen.customer_id
                                ),
                            });
                            continue;
                        }
                        self.store
                            .upsert_screen_override(screen.id, Some(pl.id))
                            .await?;
                    }
                    None => {
                        // Nothing to clear: not affected, not an error.
                        if screen.playlist_override.is_none() {
                            continue;
                        }
                        self.store.upsert_screen_override(screen.id, None).await?;
                    }
                }

                outcome.affected_ids.push(screen.id);
                outcome
                    .by_customer
                    .entry(screen.customer_id)
                    .or_default()
                    .push(screen.id);
            }

            if (page.len() as i64) < self.batch_size {
                break;
            }
        }

        // Explicitly-listed screens that never showed up in any page are
        // reported rather than silently dropped.
        if let ScreenScope::Screens(ids) = &scope {
            for &id in ids {
                if !seen.contains(&id) {
                    outcome.skipped.push(SkippedScreen {
                        screen_id: id,
                        reason: "screen not found".to_string(),
                    });
                }
            }
        }

        tracing::info!(
            affected = outcome.affected_ids.len(),
            skipped = outcome.skipped.len(),
            "Bulk assignment writes committed"
        );

        // Writes are committed; everything from here is best-effort
        // acceleration of device convergence.
        let version_hint = playlist.as_ref().map(|p| p.content_version.as_str());
        let report = self.fanout.bump(&outcome.affected_ids, version_hint).await;
        outcome.push_failed = report.failed;

        let notify_scope = match &scope {
            ScreenScope::Screens(_) => NotifyScope::PerScreen,
            ScreenScope::All | ScreenScope::Customer(_) => NotifyScope::TenantWide,
        };
        for (customer_id, screen_ids) in &outcome.by_customer {
            self.notifier
                .notify(*customer_id, screen_ids, &outcome.content_version, notify_scope);
        }

        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{Clock, DefaultPlaylistCache};
    use crate::resolver::PlaylistResolver;
    use crate::teststore::{test_items, ManualClock, MemStore, RecordingGateway};

    use std::time::Duration;

    use assert_matches::assert_matches;
    use beamview_events::{ConfigChangeEvent, EventBus};
    use beamview_push::PushGateway;

    struct Harness {
        store: Arc<MemStore>,
        gateway: Arc<RecordingGateway>,
        bus: Arc<EventBus>,
        engine: BulkAssignmentEngine,
    }

    fn harness(gateway: RecordingGateway) -> Harness {
        let store = Arc::new(MemStore::new());
        let gateway = Arc::new(gateway);
        let bus = Arc::new(EventBus::default());
        let fanout = Arc::new(PushFanoutService::new(
            Arc::clone(&gateway) as Arc<dyn PushGateway>
        ));
        let notifier = Arc::new(ConfigChangeNotifier::new(Arc::clone(&bus)));
        let engine = BulkAssignmentEngine::new(
            Arc::clone(&store) as Arc<dyn PlaylistStore>,
            fanout,
            notifier,
        );
        Harness {
            store,
            gateway,
            bus,
            engine,
        }
    }

    fn drain(rx: &mut tokio::sync::broadcast::Receiver<ConfigChangeEvent>) -> Vec<ConfigChangeEvent> {
        let mut out = Vec::new();
        while let Ok(e) = rx.try_recv() {
            out.push(e);
        }
        out
    }

    #[tokio::test]
    async fn company_assignment_end_to_end() {
        // Tenant 1: default P1, three screens without assignment.
        let h = harness(RecordingGateway::new());
        let mut rx = h.bus.subscribe();
        h.store.add_playlist(1, 1, "P1", true, test_items(1, 2));
        let p2 = h.store.add_playlist(1, 2, "P2", false, test_items(2, 3));
        for id in [101, 102, 103] {
            h.store.add_screen(id, 1, None, None);
        }

        let outcome = h
            .engine
            .apply_assignment(ScreenScope::Customer(1), Some(2))
            .await
            .unwrap();

        // All three overrides set, all three bumped with P2's version.
        assert_eq!(outcome.affected_ids, vec![101, 102, 103]);
        assert!(outcome.skipped.is_empty());
        for id in [101, 102, 103] {
            assert_eq!(h.store.screen(id).playlist_override, Some(2));
        }
        let mut bumped = h.gateway.attempted_ids();
        bumped.sort_unstable();
        assert_eq!(bumped, vec![101, 102, 103]);
        assert!(h
            .gateway
            .attempted_versions()
            .iter()
            .all(|v| *v == p2.content_version));

        // Exactly one tenant-scoped event carrying P2's version.
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].customer_id, 1);
        assert_eq!(events[0].screen_id, None);
        assert_eq!(events[0].content_version, p2.content_version);
    }

    #[tokio::test]
    async fn clearing_overrides_falls_back_to_the_default() {
        let h = harness(RecordingGateway::new());
        let p1 = h.store.add_playlist(1, 1, "P1", true, test_items(1, 2));
        h.store.add_playlist(1, 2, "P2", false, test_items(2, 3));
        for id in [101, 102, 103] {
            h.store.add_screen(id, 1, None, Some(2));
        }

        let outcome = h
            .engine
            .apply_assignment(ScreenScope::Customer(1), None)
            .await
            .unwrap();
        assert_eq!(outcome.affected_ids.len(), 3);
        assert_eq!(outcome.content_version, "");

        // Subsequent resolution lands on the tenant default again.
        let cache = Arc::new(DefaultPlaylistCache::with_clock(
            Arc::clone(&h.store) as Arc<dyn PlaylistStore>,
            Arc::new(ManualClock::new()) as Arc<dyn Clock>,
            Duration::from_secs(60),
        ));
        let resolver =
            PlaylistResolver::new(Arc::clone(&h.store) as Arc<dyn PlaylistStore>, cache);
        let resolved = resolver.resolve(&h.store.screen(101)).await.unwrap().unwrap();
        assert_eq!(resolved.playlist.id, 1);
        assert_eq!(resolved.playlist.content_version, p1.content_version);
    }

    #[tokio::test]
    async fn reapplying_the_same_assignment_converges() {
        let h = harness(RecordingGateway::new());
        h.store.add_playlist(1, 2, "P2", false, test_items(2, 1));
        for id in [101, 102] {
            h.store.add_screen(id, 1, None, None);
        }

        let first = h
            .engine
            .apply_assignment(ScreenScope::Customer(1), Some(2))
            .await
            .unwrap();
        let second = h
            .engine
            .apply_assignment(ScreenScope::Customer(1), Some(2))
            .await
            .unwrap();

        assert_eq!(first.affected_ids, second.affected_ids);
        assert_eq!(h.store.screen(101).playlist_override, Some(2));
        assert_eq!(h.store.screen(102).playlist_override, Some(2));

        // Clearing twice: the second run finds nothing left to clear.
        let cleared = h
            .engine
            .apply_assignment(ScreenScope::Customer(1), None)
            .await
            .unwrap();
        assert_eq!(cleared.affected_ids.len(), 2);
        let again = h
            .engine
            .apply_assignment(ScreenScope::Customer(1), None)
            .await
            .unwrap();
        assert!(again.affected_ids.is_empty());
    }

    #[tokio::test]
    async fn cross_tenant_screens_are_skipped_not_fatal() {
        let h = harness(RecordingGateway::new());
        h.store.add_playlist(1, 2, "P2", false, test_items(2, 1));
        h.store.add_screen(101, 1, None, None);
        h.store.add_screen(102, 9, None, None); // other tenant
        h.store.add_screen(103, 1, None, None);

        let outcome = h
            .engine
            .apply_assignment(ScreenScope::All, Some(2))
            .await
            .unwrap();

        assert_eq!(outcome.affected_ids, vec![101, 103]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].screen_id, 102);
        assert_eq!(h.store.screen(102).playlist_override, None);
    }

    #[tokio::test]
    async fn explicit_list_emits_per_screen_events_and_reports_missing_ids() {
        let h = harness(RecordingGateway::new());
        let mut rx = h.bus.subscribe();
        h.store.add_playlist(1, 2, "P2", false, test_items(2, 1));
        h.store.add_screen(101, 1, None, None);
        h.store.add_screen(102, 1, None, None);

        let outcome = h
            .engine
            .apply_assignment(ScreenScope::Screens(vec![101, 102, 777]), Some(2))
            .await
            .unwrap();

        assert_eq!(outcome.affected_ids, vec![101, 102]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].screen_id, 777);
        assert_eq!(outcome.skipped[0].reason, "screen not found");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.screen_id.is_some()));
    }

    #[tokio::test]
    async fn paging_covers_scopes_larger_than_one_batch() {
        let h = harness(RecordingGateway::new());
        h.store.add_playlist(1, 2, "P2", false, test_items(2, 1));
        for id in 101..=107 {
            h.store.add_screen(id, 1, None, None);
        }

        let outcome = h
            .engine
            .with_batch_size(2)
            .apply_assignment(ScreenScope::Customer(1), Some(2))
            .await
            .unwrap();

        assert_eq!(outcome.affected_ids, (101..=107).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn push_failures_do_not_fail_the_operation() {
        let h = harness(RecordingGateway::failing(&[102]));
        h.store.add_playlist(1, 2, "P2", false, test_items(2, 1));
        for id in [101, 102, 103] {
            h.store.add_screen(id, 1, None, None);
        }

        let outcome = h
            .engine
            .apply_assignment(ScreenScope::Customer(1), Some(2))
            .await
            .unwrap();

        // The write went through everywhere; only the bump for 102 failed.
        assert_eq!(outcome.affected_ids, vec![101, 102, 103]);
        assert_eq!(outcome.push_failed, vec![102]);
        assert_eq!(h.store.screen(102).playlist_override, Some(2));
    }

    #[tokio::test]
    async fn missing_target_playlist_is_a_hard_error() {
        let h = harness(RecordingGateway::new());
        h.store.add_screen(101, 1, None, None);

        let err = h
            .engine
            .apply_assignment(ScreenScope::Customer(1), Some(42))
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "playlist", id: 42 });
        assert!(h.gateway.attempted_ids().is_empty());
    }
}
