pub mod health;

use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::handlers::{bulk, device, playlists};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// PATCH  /screens/playlist                               explicit-list assignment
/// PATCH  /screens/playlist/all                           platform-wide assignment
/// POST   /screens/broadcast-config                       bump selected screens
///
/// PATCH  /customers/{id}/screens/playlist                tenant-wide assignment
/// POST   /customers/{id}/broadcast-config                bump all tenant screens
/// POST   /customers/{id}/playlists                       create playlist
/// POST   /customers/{id}/playlists/{pid}/default         set tenant default
///
/// DELETE /playlists/{pid}                                delete playlist
/// POST   /playlists/{pid}/items                          add item
/// PATCH  /playlists/{pid}/items/{item_id}                update item
/// DELETE /playlists/{pid}/items/{item_id}                delete item
/// PUT    /playlists/{pid}/items/reorder                  reorder items
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/screens/playlist", patch(bulk::assign_to_screens))
        .route("/screens/playlist/all", patch(bulk::assign_to_all))
        .route("/screens/broadcast-config", post(bulk::broadcast_screens))
        .route(
            "/customers/{customer_id}/screens/playlist",
            patch(bulk::assign_to_customer),
        )
        .route(
            "/customers/{customer_id}/broadcast-config",
            post(bulk::broadcast_customer),
        )
        .route(
            "/customers/{customer_id}/playlists",
            post(playlists::create_playlist),
        )
        .route(
            "/customers/{customer_id}/playlists/{playlist_id}/default",
            post(playlists::set_default),
        )
        .route("/playlists/{playlist_id}", delete(playlists::delete_playlist))
        .route("/playlists/{playlist_id}/items", post(playlists::add_item))
        .route(
            "/playlists/{playlist_id}/items/reorder",
            put(playlists::reorder_items),
        )
        .route(
            "/playlists/{playlist_id}/items/{item_id}",
            patch(playlists::update_item).delete(playlists::delete_item),
        )
}

/// Build the `/device/v1` route tree (device poll path).
///
/// ```text
/// GET    /screens/{id}/config      config snapshot (version + items)
/// POST   /screens/{id}/heartbeat   check-in
/// ```
pub fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/screens/{screen_id}/config", get(device::config))
        .route("/screens/{screen_id}/heartbeat", post(device::heartbeat))
}
