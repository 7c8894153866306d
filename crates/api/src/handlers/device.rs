//! Handlers for the device poll path.
//!
//! Devices compare `content_version` for equality against their local copy
//! and re-fetch when it differs; the version string is opaque to them. The
//! poll path is the fallback consistency mechanism when a push bump is lost.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::json;

use beamview_core::error::CoreError;
use beamview_core::types::DbId;
use beamview_core::version::EMPTY_VERSION;
use beamview_db::repositories::ScreenRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// How long a device should wait before polling again.
const POLL_AFTER_SECS: u32 = 60;

/// GET /device/v1/screens/{id}/config
///
/// Resolve the screen's effective playlist and return the config snapshot.
/// A screen that resolves to nothing gets the reserved empty version and an
/// empty item list, so devices can blank out without special-casing.
pub async fn config(
    State(state): State<AppState>,
    Path(screen_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let screen = state
        .store
        .find_screen(screen_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "screen",
            id: screen_id,
        })?;

    let resolved = state.resolver.resolve(&screen).await?;

    let (content_version, updated_at, items) = match resolved {
        Some(found) => {
            let items: Vec<serde_json::Value> = found
                .items
                .iter()
                .map(|item| {
                    json!({
                        "type": item.kind.as_str(),
                        "url": item.src,
                        "duration_sec": item.duration_secs,
                    })
                })
                .collect();
            (
                found.playlist.content_version,
                found.playlist.updated_at,
                items,
            )
        }
        None => (EMPTY_VERSION.to_string(), chrono::Utc::now(), Vec::new()),
    };

    Ok(Json(json!({
        "content_version": content_version,
        "updated_at": updated_at.to_rfc3339(),
        "poll_after_sec": POLL_AFTER_SECS,
        "items": items,
    })))
}

/// POST /device/v1/screens/{id}/heartbeat
///
/// Record a device check-in.
pub async fn heartbeat(
    State(state): State<AppState>,
    Path(screen_id): Path<DbId>,
) -> AppResult<Json<serde_json::Value>> {
    let touched = ScreenRepo::touch_check_in(&state.pool, screen_id).await?;
    if !touched {
        return Err(CoreError::NotFound {
            entity: "screen",
            id: screen_id,
        }
        .into());
    }

    Ok(Json(json!({
        "message": "ok",
        "server_time": chrono::Utc::now().to_rfc3339(),
    })))
}
