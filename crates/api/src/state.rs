use std::sync::Arc;

use beamview_core::store::PlaylistStore;
use beamview_events::{ConfigChangeNotifier, EventBus};
use beamview_push::PushFanoutService;
use beamview_sync::{BulkAssignmentEngine, DefaultPlaylistCache, PlaylistResolver};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: beamview_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Store seam shared by resolver, cache, and bulk engine.
    pub store: Arc<dyn PlaylistStore>,
    /// Per-tenant default playlist cache.
    pub cache: Arc<DefaultPlaylistCache>,
    /// Effective-playlist resolution for the device poll path.
    pub resolver: Arc<PlaylistResolver>,
    /// Bump fanout to the real-time gateway.
    pub fanout: Arc<PushFanoutService>,
    /// Centralized event bus for config-change events.
    pub event_bus: Arc<EventBus>,
    /// Per-screen / tenant-wide event emission.
    pub notifier: Arc<ConfigChangeNotifier>,
    /// Chunked bulk assignment.
    pub engine: Arc<BulkAssignmentEngine>,
}
