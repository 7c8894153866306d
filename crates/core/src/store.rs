//! Domain entities and the `PlaylistStore` seam.
//!
//! [`PlaylistStore`] abstracts the relational store so the sync services can
//! be exercised against an in-memory implementation in tests and against
//! Postgres in production (`beamview-db`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// The kind of media a playlist item displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Image,
    Video,
    Web,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Image => "image",
            ItemKind::Video => "video",
            ItemKind::Web => "web",
        }
    }

    /// Parse a stored kind string, rejecting anything outside the known set.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "image" => Ok(ItemKind::Image),
            "video" => Ok(ItemKind::Video),
            "web" => Ok(ItemKind::Web),
            other => Err(CoreError::Validation(format!(
                "Unknown playlist item kind: {other}"
            ))),
        }
    }
}

/// A tenant-owned playlist. `content_version` is derived from the item set
/// and never set by callers directly.
#[derive(Debug, Clone, Serialize)]
pub struct Playlist {
    pub id: DbId,
    pub customer_id: DbId,
    pub name: String,
    pub is_default: bool,
    pub content_version: String,
    pub updated_at: Timestamp,
}

/// A single entry of a playlist, ordered by `sort` within its playlist.
///
/// `duration_secs` must be > 0 for images; 0 is allowed for videos and web
/// pages and means "natural / unspecified".
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistItem {
    pub id: DbId,
    pub playlist_id: DbId,
    pub kind: ItemKind,
    pub src: String,
    pub duration_secs: i32,
    pub sort: i32,
    pub checksum: Option<String>,
}

/// A playlist together with its items in display order.
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistWithItems {
    pub playlist: Playlist,
    pub items: Vec<PlaylistItem>,
}

/// Who may manage a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessScope {
    /// Visible to all of the tenant's supervisors.
    Company,
    /// Bound to a single assignee.
    User,
}

/// A signage screen. The *effective* playlist is resolved, never stored:
/// explicit assignment wins over the override, which wins over the tenant
/// default.
#[derive(Debug, Clone, Serialize)]
pub struct Screen {
    pub id: DbId,
    pub customer_id: DbId,
    /// Explicit assignment, first in resolution precedence.
    pub playlist_id: Option<DbId>,
    /// Per-screen override written by bulk assignment, second in precedence.
    pub playlist_override: Option<DbId>,
    pub access_scope: AccessScope,
    pub last_check_in_at: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Store seam
// ---------------------------------------------------------------------------

/// Which screens a bulk operation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenScope {
    /// Every screen on the platform.
    All,
    /// Every screen of one tenant.
    Customer(DbId),
    /// An explicit list of screen ids.
    Screens(Vec<DbId>),
}

/// Read/write access to playlists, items, and screens.
///
/// All lookups return `Ok(None)` / empty pages rather than erroring on
/// "not found"; errors are reserved for the backend itself.
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// The tenant's default playlist with its items, if one is set.
    async fn find_default(&self, customer_id: DbId)
        -> Result<Option<PlaylistWithItems>, CoreError>;

    /// A playlist by id, without items.
    async fn find_playlist(&self, playlist_id: DbId) -> Result<Option<Playlist>, CoreError>;

    /// A playlist by id together with its ordered items.
    async fn find_playlist_with_items(
        &self,
        playlist_id: DbId,
    ) -> Result<Option<PlaylistWithItems>, CoreError>;

    /// Items of a playlist ordered by `sort` ascending.
    async fn list_items_ordered(&self, playlist_id: DbId)
        -> Result<Vec<PlaylistItem>, CoreError>;

    /// A screen by id.
    async fn find_screen(&self, screen_id: DbId) -> Result<Option<Screen>, CoreError>;

    /// Set (`Some`) or clear (`None`) a screen's playlist override.
    async fn upsert_screen_override(
        &self,
        screen_id: DbId,
        playlist_id: Option<DbId>,
    ) -> Result<(), CoreError>;

    /// Make `playlist_id` the tenant's sole default. Returns `false` when
    /// the playlist does not belong to the tenant or no longer exists;
    /// nothing is changed in that case.
    async fn set_default_playlist(
        &self,
        customer_id: DbId,
        playlist_id: DbId,
    ) -> Result<bool, CoreError>;

    /// All screen ids of a tenant, ascending. Drives tenant-wide bumps.
    async fn list_screen_ids(&self, customer_id: DbId) -> Result<Vec<DbId>, CoreError>;

    /// One page of screens in `scope` with `id > after_id`, ascending by id,
    /// at most `limit` rows. An empty page means the scope is exhausted.
    async fn list_screens_page(
        &self,
        scope: &ScreenScope,
        after_id: DbId,
        limit: i64,
    ) -> Result<Vec<Screen>, CoreError>;
}
