//! Concurrent, failure-isolated bump fanout.
//!
//! Each screen id is an independent unit of work: a timeout or error on one
//! screen never aborts, blocks, or delays delivery to the others, and the
//! caller only ever sees a [`BumpReport`], never an error. Dispatch is
//! concurrent with a bounded in-flight cap so a large bulk operation cannot
//! overwhelm the gateway.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use beamview_core::types::DbId;

use crate::gateway::PushGateway;

/// Default cap on concurrently in-flight gateway calls.
const DEFAULT_CONCURRENCY: usize = 16;

/// Outcome of one fanout call.
///
/// `attempted` always equals the number of distinct input ids; partial
/// gateway failure shows up in `failed`, never as a missing attempt.
#[derive(Debug, Default)]
pub struct BumpReport {
    pub attempted: usize,
    pub failed: Vec<DbId>,
}

impl BumpReport {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed.len()
    }
}

/// Sends bump notifications to the gateway for a set of screens.
pub struct PushFanoutService {
    gateway: Arc<dyn PushGateway>,
    concurrency: usize,
}

impl PushFanoutService {
    pub fn new(gateway: Arc<dyn PushGateway>) -> Self {
        Self {
            gateway,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Override the in-flight cap (must be >= 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Bump every distinct screen in `screen_ids` (duplicates collapse to
    /// one delivery), carrying `version_hint` if given or a generated
    /// `pl-<unix-ts>` tag otherwise.
    ///
    /// Failures are logged per screen and collected in the report; they are
    /// never escalated. The owning mutation already committed, so a failed
    /// push only delays the device until its next poll.
    pub async fn bump(&self, screen_ids: &[DbId], version_hint: Option<&str>) -> BumpReport {
        let mut seen = HashSet::new();
        let targets: Vec<DbId> = screen_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        if targets.is_empty() {
            return BumpReport::default();
        }

        let version = match version_hint {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => format!("pl-{}", chrono::Utc::now().timestamp()),
        };

        let results = stream::iter(targets.iter().copied())
            .map(|screen_id| {
                let gateway = Arc::clone(&self.gateway);
                let version = version.clone();
                async move {
                    match gateway.bump_screen(screen_id, &version).await {
                        Ok(()) => None,
                        Err(e) => {
                            tracing::warn!(screen_id, error = %e, "Push bump failed");
                            Some(screen_id)
                        }
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<Option<DbId>>>()
            .await;

        let failed: Vec<DbId> = results.into_iter().flatten().collect();
        if !failed.is_empty() {
            tracing::warn!(
                attempted = targets.len(),
                failed = failed.len(),
                "Push fanout completed with failures"
            );
        }

        BumpReport {
            attempted: targets.len(),
            failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
