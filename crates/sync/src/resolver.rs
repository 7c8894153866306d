//! Effective-playlist resolution for a screen.
//!
//! Precedence, first match wins:
//! 1. the screen's explicit assignment, if the playlist still exists;
//! 2. the screen's per-screen override, if the playlist still exists;
//! 3. the tenant's default playlist, via [`DefaultPlaylistCache`];
//! 4. none.
//!
//! A dangling reference (the assigned playlist was deleted) is treated as
//! "not set" and falls through to the next level — resolution never errors
//! over stale pointers. Reads have no side effects.

use std::sync::Arc;

use beamview_core::error::CoreError;
use beamview_core::store::{PlaylistStore, PlaylistWithItems, Screen};

use crate::cache::DefaultPlaylistCache;

pub struct PlaylistResolver {
    store: Arc<dyn PlaylistStore>,
    cache: Arc<DefaultPlaylistCache>,
}

impl PlaylistResolver {
    pub fn new(store: Arc<dyn PlaylistStore>, cache: Arc<DefaultPlaylistCache>) -> Self {
        Self { store, cache }
    }

    /// Resolve the playlist this screen should display right now.
    pub async fn resolve(&self, screen: &Screen) -> Result<Option<PlaylistWithItems>, CoreError> {
        if let Some(playlist_id) = screen.playlist_id {
            if let Some(found) = self.store.find_playlist_with_items(playlist_id).await? {
                return Ok(Some(found));
            }
        }

        if let Some(playlist_id) = screen.playlist_override {
            if let Some(found) = self.store.find_playlist_with_items(playlist_id).await? {
                return Ok(Some(found));
            }
        }

        // The default level always goes through the cache, never a direct
        // store query — this is what bounds store load under device polling.
        self.cache.get_default(screen.customer_id).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
