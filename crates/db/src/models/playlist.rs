//! Playlist and playlist-item row models.

use serde::Serialize;
use sqlx::FromRow;

use beamview_core::error::CoreError;
use beamview_core::store::{ItemKind, Playlist, PlaylistItem};
use beamview_core::types::{DbId, Timestamp};

/// A row from the `playlists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaylistRow {
    pub id: DbId,
    pub customer_id: DbId,
    pub name: String,
    pub is_default: bool,
    pub content_version: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PlaylistRow> for Playlist {
    fn from(row: PlaylistRow) -> Self {
        Playlist {
            id: row.id,
            customer_id: row.customer_id,
            name: row.name,
            is_default: row.is_default,
            content_version: row.content_version,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `playlist_items` table. `kind` is stored as text and
/// validated on the way out.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlaylistItemRow {
    pub id: DbId,
    pub playlist_id: DbId,
    pub kind: String,
    pub src: String,
    pub duration_secs: i32,
    pub sort: i32,
    pub checksum: Option<String>,
}

impl TryFrom<PlaylistItemRow> for PlaylistItem {
    type Error = CoreError;

    fn try_from(row: PlaylistItemRow) -> Result<Self, CoreError> {
        Ok(PlaylistItem {
            id: row.id,
            playlist_id: row.playlist_id,
            kind: ItemKind::parse(&row.kind)?,
            src: row.src,
            duration_secs: row.duration_secs,
            sort: row.sort,
            checksum: row.checksum,
        })
    }
}
