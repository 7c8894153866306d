//! Bulk assignment and broadcast endpoints.
//!
//! These drive the [`BulkAssignmentEngine`] and report what the original
//! caller cares about: how many screens changed, which were skipped and
//! why, and which push bumps failed. Push failures never fail the request —
//! the store writes already committed.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use beamview_core::error::CoreError;
use beamview_core::store::ScreenScope;
use beamview_core::types::DbId;
use beamview_events::NotifyScope;
use beamview_sync::AssignmentOutcome;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body for the explicit-list assignment.
#[derive(Debug, Deserialize)]
pub struct AssignScreensRequest {
    pub screen_ids: Vec<DbId>,
    /// `null` clears the override; the screens fall back to the next
    /// precedence level.
    pub playlist_id: Option<DbId>,
}

/// Body for the tenant-wide and platform-wide assignments.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub playlist_id: Option<DbId>,
}

/// Body for the explicit-list broadcast.
#[derive(Debug, Deserialize)]
pub struct BroadcastScreensRequest {
    pub screen_ids: Vec<DbId>,
}

fn outcome_body(message: &str, outcome: &AssignmentOutcome) -> serde_json::Value {
    json!({
        "message": message,
        "count": outcome.affected_ids.len(),
        "skipped": outcome.skipped,
        "push_failed": outcome.push_failed,
    })
}

// ---------------------------------------------------------------------------
// Assignment
// ---------------------------------------------------------------------------

/// PATCH /api/v1/screens/playlist
///
/// Assign (or clear) the override for an explicit list of screens. Emits
/// one config-change event per screen since the caller targeted them
/// individually.
pub async fn assign_to_screens(
    State(state): State<AppState>,
    Json(body): Json<AssignScreensRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if body.screen_ids.is_empty() {
        return Err(AppError::BadRequest("screen_ids must not be empty".into()));
    }

    let outcome = state
        .engine
        .apply_assignment(ScreenScope::Screens(body.screen_ids), body.playlist_id)
        .await?;

    Ok(Json(outcome_body("Assigned to selected screens", &outcome)))
}

/// PATCH /api/v1/screens/playlist/all
///
/// With a playlist id: assign it to every screen of that playlist's tenant.
/// With `null`: clear the override on every screen of every tenant, so each
/// falls back to its own company default.
pub async fn assign_to_all(
    State(state): State<AppState>,
    Json(body): Json<AssignRequest>,
) -> AppResult<Json<serde_json::Value>> {
    match body.playlist_id {
        None => {
            let outcome = state
                .engine
                .apply_assignment(ScreenScope::All, None)
                .await?;
            Ok(Json(outcome_body(
                "All screens set to company default (override cleared)",
                &outcome,
            )))
        }
        Some(playlist_id) => {
            // Narrow the scope to the owning tenant up front; other
            // tenants' screens are out of scope for this operation, not
            // skipped rows.
            let playlist = state
                .store
                .find_playlist(playlist_id)
                .await?
                .ok_or(CoreError::NotFound {
                    entity: "playlist",
                    id: playlist_id,
                })?;

            let outcome = state
                .engine
                .apply_assignment(
                    ScreenScope::Customer(playlist.customer_id),
                    Some(playlist_id),
                )
                .await?;

            let mut body = outcome_body(
                "Assigned playlist to all screens of the owning company",
                &outcome,
            );
            body["customer_id"] = json!(playlist.customer_id);
            body["playlist_id"] = json!(playlist_id);
            Ok(Json(body))
        }
    }
}

/// PATCH /api/v1/customers/{customer_id}/screens/playlist
///
/// Tenant-scoped assignment; the playlist must belong to the tenant.
pub async fn assign_to_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
    Json(body): Json<AssignRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if let Some(playlist_id) = body.playlist_id {
        let playlist = state
            .store
            .find_playlist(playlist_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "playlist",
                id: playlist_id,
            })?;
        if playlist.customer_id != customer_id {
            return Err(CoreError::ScopeViolation {
                playlist_id,
                customer_id,
            }
            .into());
        }
    }

    let outcome = state
        .engine
        .apply_assignment(ScreenScope::Customer(customer_id), body.playlist_id)
        .await?;

    let message = if body.playlist_id.is_some() {
        "Assigned to all company screens"
    } else {
        "Company screens reset to default (override cleared)"
    };
    let mut response = outcome_body(message, &outcome);
    response["customer_id"] = json!(customer_id);
    Ok(Json(response))
}

// ---------------------------------------------------------------------------
// Broadcast (no state change)
// ---------------------------------------------------------------------------

/// Version tag for broadcasts: devices treat any unknown version as "go
/// re-fetch", so a constant is enough to force a refresh.
const FORCE_VERSION: &str = "force";

/// POST /api/v1/customers/{customer_id}/broadcast-config
///
/// Bump every screen of the tenant and emit one tenant-wide event, without
/// changing any assignment.
pub async fn broadcast_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .notifier
        .notify(customer_id, &[], "", NotifyScope::TenantWide);

    let screen_ids = state.store.list_screen_ids(customer_id).await?;
    let report = state.fanout.bump(&screen_ids, Some(FORCE_VERSION)).await;

    Ok(Json(json!({
        "message": "Broadcast sent to company screens",
        "customer_id": customer_id,
        "count": report.attempted,
        "push_failed": report.failed,
    })))
}

/// POST /api/v1/screens/broadcast-config
///
/// Bump an explicit list of screens, with one event per screen. Unknown
/// ids are reported, not fatal.
pub async fn broadcast_screens(
    State(state): State<AppState>,
    Json(body): Json<BroadcastScreensRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if body.screen_ids.is_empty() {
        return Err(AppError::BadRequest("screen_ids must not be empty".into()));
    }

    let mut found: Vec<DbId> = Vec::new();
    let mut missing: Vec<DbId> = Vec::new();
    for screen_id in &body.screen_ids {
        match state.store.find_screen(*screen_id).await? {
            Some(screen) => {
                found.push(screen.id);
                state
                    .notifier
                    .notify(screen.customer_id, &[screen.id], "", NotifyScope::PerScreen);
            }
            None => missing.push(*screen_id),
        }
    }

    let report = state.fanout.bump(&found, Some(FORCE_VERSION)).await;

    Ok(Json(json!({
        "message": "Broadcast sent",
        "count": report.attempted,
        "missing": missing,
        "push_failed": report.failed,
    })))
}
