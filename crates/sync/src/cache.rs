//! Per-tenant cache of the resolved default playlist.
//!
//! Every resolution that falls through to the tenant default must go through
//! this cache rather than the store, to bound read load under high device
//! poll frequency. The cache is not authoritative: entries expire after a
//! short TTL and any write path that changes what the default resolves to
//! must call [`DefaultPlaylistCache::invalidate`] in the same logical
//! operation (set-default, deleting the default, item mutations on the
//! current default).
//!
//! Time is injected through [`Clock`] so tests control expiry
//! deterministically instead of sleeping.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use beamview_core::error::CoreError;
use beamview_core::store::{PlaylistStore, PlaylistWithItems};
use beamview_core::types::DbId;

/// How long a cached default (present or absent) stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of monotonic time for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Production clock backed by [`Instant::now`].
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// One cached resolution. `None` caches "this tenant has no default" for the
/// same TTL, so a tenant without a default does not hammer the store.
struct CacheEntry {
    value: Option<PlaylistWithItems>,
    expires_at: Instant,
}

/// TTL cache of `customer_id -> default playlist (with items)`.
pub struct DefaultPlaylistCache {
    store: Arc<dyn PlaylistStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    entries: Mutex<HashMap<DbId, CacheEntry>>,
}

impl DefaultPlaylistCache {
    pub fn new(store: Arc<dyn PlaylistStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), DEFAULT_TTL)
    }

    pub fn with_clock(store: Arc<dyn PlaylistStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The tenant's current default playlist, served from cache when fresh.
    ///
    /// On a miss the value is loaded from the store and cached for the TTL.
    /// Concurrent misses for the same tenant may each load from the store;
    /// that costs redundant reads, never a wrong result — the last writer
    /// simply overwrites an equally-fresh entry.
    pub async fn get_default(
        &self,
        customer_id: DbId,
    ) -> Result<Option<PlaylistWithItems>, CoreError> {
        let now = self.clock.now();

        {
            let entries = self.entries.lock().await;
            if let Some(entry) = entries.get(&customer_id) {
                if entry.expires_at > now {
                    return Ok(entry.value.clone());
                }
            }
        }

        // Load outside the lock so a slow store read does not serialize
        // every concurrently-polling screen.
        let value = self.store.find_default(customer_id).await?;

        let mut entries = self.entries.lock().await;
        entries.insert(
            customer_id,
            CacheEntry {
                value: value.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(value)
    }

    /// Drop the tenant's entry so the next read reflects current store
    /// state. Must be called by every write path that changes the default
    /// or its item content; missing a call means stale reads up to the TTL.
    pub async fn invalidate(&self, customer_id: DbId) {
        let removed = self.entries.lock().await.remove(&customer_id).is_some();
        tracing::debug!(customer_id, removed, "Invalidated default playlist cache");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
