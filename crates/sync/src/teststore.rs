//! In-memory `PlaylistStore` and a manual clock for deterministic tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use beamview_core::error::CoreError;
use beamview_core::store::{
    AccessScope, ItemKind, Playlist, PlaylistItem, PlaylistStore, PlaylistWithItems, Screen,
    ScreenScope,
};
use beamview_core::types::DbId;
use beamview_core::version::compute_version;

use beamview_push::gateway::{GatewayError, PushGateway};

use crate::cache::Clock;

/// Clock whose time only moves when a test calls [`ManualClock::advance`].
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }
}

/// Build `count` image items for playlist `playlist_id`, one per sort slot.
pub fn test_items(playlist_id: DbId, count: usize) -> Vec<PlaylistItem> {
    (0..count)
        .map(|i| PlaylistItem {
            id: playlist_id * 100 + i as DbId,
            playlist_id,
            kind: ItemKind::Image,
            src: format!("media/{playlist_id}/{i}.png"),
            duration_secs: 10,
            sort: i as i32 + 1,
            checksum: None,
        })
        .collect()
}

/// Hash-map-backed store double. Screens are kept in a `BTreeMap` so paging
/// by ascending id behaves like the SQL implementation.
pub struct MemStore {
    playlists: Mutex<HashMap<DbId, PlaylistWithItems>>,
    screens: Mutex<BTreeMap<DbId, Screen>>,
    default_loads: AtomicUsize,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            playlists: Mutex::new(HashMap::new()),
            screens: Mutex::new(BTreeMap::new()),
            default_loads: AtomicUsize::new(0),
        }
    }

    /// Insert a playlist; `content_version` is computed from `items`.
    pub fn add_playlist(
        &self,
        customer_id: DbId,
        id: DbId,
        name: &str,
        is_default: bool,
        items: Vec<PlaylistItem>,
    ) -> Playlist {
        let playlist = Playlist {
            id,
            customer_id,
            name: name.to_string(),
            is_default,
            content_version: compute_version(&items),
            updated_at: chrono::Utc::now(),
        };
        self.playlists.lock().unwrap().insert(
            id,
            PlaylistWithItems {
                playlist: playlist.clone(),
                items,
            },
        );
        playlist
    }

    /// Make `playlist_id` the sole default of `customer_id`.
    pub fn set_default(&self, customer_id: DbId, playlist_id: DbId) {
        let mut playlists = self.playlists.lock().unwrap();
        for entry in playlists.values_mut() {
            if entry.playlist.customer_id == customer_id {
                entry.playlist.is_default = entry.playlist.id == playlist_id;
            }
        }
    }

    pub fn remove_playlist(&self, playlist_id: DbId) {
        self.playlists.lock().unwrap().remove(&playlist_id);
    }

    pub fn add_screen(
        &self,
        id: DbId,
        customer_id: DbId,
        playlist_id: Option<DbId>,
        playlist_override: Option<DbId>,
    ) -> Screen {
        let screen = Screen {
            id,
            customer_id,
            playlist_id,
            playlist_override,
            access_scope: AccessScope::Company,
            last_check_in_at: None,
        };
        self.screens.lock().unwrap().insert(id, screen.clone());
        screen
    }

    pub fn screen(&self, id: DbId) -> Screen {
        self.screens.lock().unwrap().get(&id).cloned().expect("screen exists")
    }

    /// How many times `find_default` hit the store.
    pub fn default_loads(&self) -> usize {
        self.default_loads.load(Ordering::SeqCst)
    }
}

/// Gateway double recording every bump and failing a chosen id set.
pub struct RecordingGateway {
    fail_ids: HashSet<DbId>,
    attempts: Mutex<Vec<(DbId, String)>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::failing(&[])
    }

    pub fn failing(ids: &[DbId]) -> Self {
        Self {
            fail_ids: ids.iter().copied().collect(),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempted_ids(&self) -> Vec<DbId> {
        self.attempts.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn attempted_versions(&self) -> Vec<String> {
        self.attempts.lock().unwrap().iter().map(|(_, v)| v.clone()).collect()
    }
}

#[async_trait]
impl PushGateway for RecordingGateway {
    async fn bump_screen(&self, screen_id: DbId, version: &str) -> Result<(), GatewayError> {
        self.attempts
            .lock()
            .unwrap()
            .push((screen_id, version.to_string()));
        if self.fail_ids.contains(&screen_id) {
            Err(GatewayError::HttpStatus(503))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PlaylistStore for MemStore {
    async fn find_default(
        &self,
        customer_id: DbId,
    ) -> Result<Option<PlaylistWithItems>, CoreError> {
        self.default_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .values()
            .find(|p| p.playlist.customer_id == customer_id && p.playlist.is_default)
            .cloned())
    }

    async fn find_playlist(&self, playlist_id: DbId) -> Result<Option<Playlist>, CoreError> {
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .get(&playlist_id)
            .map(|p| p.playlist.clone()))
    }

    async fn find_playlist_with_items(
        &self,
        playlist_id: DbId,
    ) -> Result<Option<PlaylistWithItems>, CoreError> {
        Ok(self.playlists.lock().unwrap().get(&playlist_id).cloned())
    }

    async fn list_items_ordered(
        &self,
        playlist_id: DbId,
    ) -> Result<Vec<PlaylistItem>, CoreError> {
        Ok(self
            .playlists
            .lock()
            .unwrap()
            .get(&playlist_id)
            .map(|p| p.items.clone())
            .unwrap_or_default())
    }

    async fn find_screen(&self, screen_id: DbId) -> Result<Option<Screen>, CoreError> {
        Ok(self.screens.lock().unwrap().get(&screen_id).cloned())
    }

    async fn upsert_screen_override(
        &self,
        screen_id: DbId,
        playlist_id: Option<DbId>,
    ) -> Result<(), CoreError> {
        let mut screens = self.screens.lock().unwrap();
        let screen = screens.get_mut(&screen_id).ok_or(CoreError::NotFound {
            entity: "screen",
            id: screen_id,
        })?;
        screen.playlist_override = playlist_id;
        Ok(())
    }

    async fn set_default_playlist(
        &self,
        customer_id: DbId,
        playlist_id: DbId,
    ) -> Result<bool, CoreError> {
        let mut playlists = self.playlists.lock().unwrap();
        let belongs = playlists
            .get(&playlist_id)
            .is_some_and(|p| p.playlist.customer_id == customer_id);
        if !belongs {
            return Ok(false);
        }
        for entry in playlists.values_mut() {
            if entry.playlist.customer_id == customer_id {
                entry.playlist.is_default = entry.playlist.id == playlist_id;
            }
        }
        Ok(true)
    }

    async fn list_screen_ids(&self, customer_id: DbId) -> Result<Vec<DbId>, CoreError> {
        Ok(self
            .screens
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.customer_id == customer_id)
            .map(|s| s.id)
            .collect())
    }

    async fn list_screens_page(
        &self,
        scope: &ScreenScope,
        after_id: DbId,
        limit: i64,
    ) -> Result<Vec<Screen>, CoreError> {
        let wanted: Option<HashSet<DbId>> = match scope {
            ScreenScope::Screens(ids) => Some(ids.iter().copied().collect()),
            _ => None,
        };
        Ok(self
            .screens
            .lock()
            .unwrap()
            .range((after_id + 1)..)
            .map(|(_, s)| s)
            .filter(|s| match scope {
                ScreenScope::All => true,
                ScreenScope::Customer(cid) => s.customer_id == *cid,
                ScreenScope::Screens(_) => wanted.as_ref().unwrap().contains(&s.id),
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
