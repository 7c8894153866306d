//! Playlist and playlist-item mutations.
//!
//! Every item mutation recomputes the content version; when the touched
//! playlist is the tenant's current default, the default cache is
//! invalidated in the same operation, *before* the change event goes out —
//! a device that reacts to the event by re-polling must never see the stale
//! cached default. Connected devices are then bumped through the fanout so
//! they do not wait out their poll interval.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use beamview_core::error::CoreError;
use beamview_core::store::{ItemKind, Playlist};
use beamview_core::types::DbId;
use beamview_db::repositories::PlaylistRepo;
use beamview_events::NotifyScope;
use beamview_push::BumpReport;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for `POST /customers/{id}/playlists`.
#[derive(Debug, Deserialize)]
pub struct CreatePlaylist {
    pub name: String,
}

/// Body for `POST /playlists/{id}/items`.
#[derive(Debug, Deserialize)]
pub struct NewItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub src: String,
    /// Seconds; required > 0 for images, defaults to 0 (natural length)
    /// for videos and web pages.
    pub duration: Option<i32>,
    pub sort: Option<i32>,
    pub checksum: Option<String>,
}

/// Body for `PATCH /playlists/{id}/items/{item_id}`. Absent fields keep
/// their current value; in particular an absent `checksum` keeps the stored
/// one — a checksum can be replaced through this endpoint but never cleared
/// (delete and re-create the item to drop it).
#[derive(Debug, Deserialize)]
pub struct UpdateItem {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub src: Option<String>,
    pub duration: Option<i32>,
    pub sort: Option<i32>,
    pub checksum: Option<String>,
}

/// Body for `PUT /playlists/{id}/items/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub orders: Vec<OrderEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OrderEntry {
    pub id: DbId,
    pub sort: i32,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_playlist(state: &AppState, playlist_id: DbId) -> AppResult<Playlist> {
    state
        .store
        .find_playlist(playlist_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "playlist",
                id: playlist_id,
            })
        })
}

/// Post-mutation bookkeeping shared by every item write: invalidate the
/// default cache when the default changed content, announce the change
/// tenant-wide, then bump the tenant's screens with the fresh version so
/// connected devices re-poll immediately.
///
/// Public so integration tests can drive it directly against an in-memory
/// store.
pub async fn finish_item_mutation(
    state: &AppState,
    playlist: &Playlist,
    version: &str,
) -> AppResult<BumpReport> {
    if playlist.is_default {
        state.cache.invalidate(playlist.customer_id).await;
    }
    state
        .notifier
        .notify(playlist.customer_id, &[], version, NotifyScope::TenantWide);

    let screen_ids = state.store.list_screen_ids(playlist.customer_id).await?;
    Ok(state.fanout.bump(&screen_ids, Some(version)).await)
}

fn validate_item_kind(kind: &str, duration: Option<i32>) -> AppResult<(ItemKind, i32)> {
    let kind = ItemKind::parse(kind).map_err(AppError::Core)?;
    let duration = duration.unwrap_or(0);

    if duration < 0 {
        return Err(AppError::BadRequest("duration must not be negative".into()));
    }
    if kind == ItemKind::Image && duration == 0 {
        return Err(AppError::BadRequest(
            "duration is required for images".into(),
        ));
    }
    Ok((kind, duration))
}

// ---------------------------------------------------------------------------
// Playlists
// ---------------------------------------------------------------------------

/// POST /api/v1/customers/{customer_id}/playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
    Json(body): Json<CreatePlaylist>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let id = PlaylistRepo::create(&state.pool, customer_id, body.name.trim()).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Playlist created", "id": id })),
    ))
}

/// DELETE /api/v1/playlists/{playlist_id}
///
/// Deleting the tenant's default leaves the tenant without one until
/// another is set; affected devices fall back to "no content" on their
/// next resolution, which is why the cache is invalidated here.
pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let deleted =
        PlaylistRepo::delete(&state.pool, playlist_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "playlist",
                id: playlist_id,
            })?;

    if deleted.is_default {
        state.cache.invalidate(deleted.customer_id).await;
        state
            .notifier
            .notify(deleted.customer_id, &[], "", NotifyScope::TenantWide);
    }

    Ok(Json(json!({ "message": "Playlist deleted" })))
}

/// POST /api/v1/customers/{customer_id}/playlists/{playlist_id}/default
///
/// Make the playlist the tenant's sole default, then announce it and bump
/// every screen of the tenant so currently-connected devices re-poll.
pub async fn set_default(
    State(state): State<AppState>,
    Path((customer_id, playlist_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<serde_json::Value>> {
    let playlist = load_playlist(&state, playlist_id).await?;
    if playlist.customer_id != customer_id {
        return Err(CoreError::ScopeViolation {
            playlist_id,
            customer_id,
        }
        .into());
    }

    // The playlist can vanish between the lookup and the write; a false
    // return means nothing was changed, so nothing gets announced either.
    let updated = state
        .store
        .set_default_playlist(customer_id, playlist_id)
        .await?;
    if !updated {
        return Err(CoreError::NotFound {
            entity: "playlist",
            id: playlist_id,
        }
        .into());
    }
    state.cache.invalidate(customer_id).await;

    state.notifier.notify(
        customer_id,
        &[],
        &playlist.content_version,
        NotifyScope::TenantWide,
    );

    let screen_ids = state.store.list_screen_ids(customer_id).await?;
    let report = state
        .fanout
        .bump(&screen_ids, Some(&playlist.content_version))
        .await;

    Ok(Json(json!({
        "message": "Default playlist set",
        "customer_id": customer_id,
        "playlist_id": playlist_id,
        "content_version": playlist.content_version,
        "bumped": report.attempted,
        "push_failed": report.failed,
    })))
}

// ---------------------------------------------------------------------------
// Items
// ---------------------------------------------------------------------------

/// POST /api/v1/playlists/{playlist_id}/items
pub async fn add_item(
    State(state): State<AppState>,
    Path(playlist_id): Path<DbId>,
    Json(body): Json<NewItem>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let playlist = load_playlist(&state, playlist_id).await?;
    let (kind, duration) = validate_item_kind(&body.kind, body.duration)?;

    let item_id = PlaylistRepo::insert_item(
        &state.pool,
        playlist_id,
        kind.as_str(),
        &body.src,
        duration,
        body.sort,
        body.checksum.as_deref(),
    )
    .await?;

    let version = PlaylistRepo::refresh_version(&state.pool, playlist_id).await?;
    let report = finish_item_mutation(&state, &playlist, &version).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Item created",
            "id": item_id,
            "content_version": version,
            "push_failed": report.failed,
        })),
    ))
}

/// PATCH /api/v1/playlists/{playlist_id}/items/{item_id}
pub async fn update_item(
    State(state): State<AppState>,
    Path((playlist_id, item_id)): Path<(DbId, DbId)>,
    Json(body): Json<UpdateItem>,
) -> AppResult<Json<serde_json::Value>> {
    let playlist = load_playlist(&state, playlist_id).await?;

    if let Some(kind) = &body.kind {
        ItemKind::parse(kind).map_err(AppError::Core)?;
    }
    if matches!(body.duration, Some(d) if d < 0) {
        return Err(AppError::BadRequest("duration must not be negative".into()));
    }

    let updated = PlaylistRepo::update_item(
        &state.pool,
        playlist_id,
        item_id,
        body.kind.as_deref(),
        body.src.as_deref(),
        body.duration,
        body.sort,
        body.checksum.as_deref(),
    )
    .await?;
    if !updated {
        return Err(CoreError::NotFound {
            entity: "playlist item",
            id: item_id,
        }
        .into());
    }

    let version = PlaylistRepo::refresh_version(&state.pool, playlist_id).await?;
    let report = finish_item_mutation(&state, &playlist, &version).await?;

    Ok(Json(json!({
        "message": "Item updated",
        "content_version": version,
        "push_failed": report.failed,
    })))
}

/// DELETE /api/v1/playlists/{playlist_id}/items/{item_id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path((playlist_id, item_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<serde_json::Value>> {
    let playlist = load_playlist(&state, playlist_id).await?;

    let deleted = PlaylistRepo::delete_item(&state.pool, playlist_id, item_id).await?;
    if !deleted {
        return Err(CoreError::NotFound {
            entity: "playlist item",
            id: item_id,
        }
        .into());
    }

    let version = PlaylistRepo::refresh_version(&state.pool, playlist_id).await?;
    let report = finish_item_mutation(&state, &playlist, &version).await?;

    Ok(Json(json!({
        "message": "Item deleted",
        "content_version": version,
        "push_failed": report.failed,
    })))
}

/// PUT /api/v1/playlists/{playlist_id}/items/reorder
pub async fn reorder_items(
    State(state): State<AppState>,
    Path(playlist_id): Path<DbId>,
    Json(body): Json<ReorderRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if body.orders.is_empty() {
        return Err(AppError::BadRequest("orders must not be empty".into()));
    }

    let playlist = load_playlist(&state, playlist_id).await?;

    let orders: Vec<(DbId, i32)> = body.orders.iter().map(|o| (o.id, o.sort)).collect();
    PlaylistRepo::reorder_items(&state.pool, playlist_id, &orders).await?;

    let version = PlaylistRepo::refresh_version(&state.pool, playlist_id).await?;
    let report = finish_item_mutation(&state, &playlist, &version).await?;

    Ok(Json(json!({
        "message": "Items reordered",
        "content_version": version,
        "push_failed": report.failed,
    })))
}
