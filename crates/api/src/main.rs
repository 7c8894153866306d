use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beamview_api::config::ServerConfig;
use beamview_api::router::build_app_router;
use beamview_api::state::AppState;
use beamview_core::store::PlaylistStore;
use beamview_db::store::PgPlaylistStore;
use beamview_events::{ConfigChangeNotifier, EventBus};
use beamview_push::{HttpPushGateway, PushFanoutService, PushGateway};
use beamview_sync::{BulkAssignmentEngine, DefaultPlaylistCache, PlaylistResolver};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beamview_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = beamview_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    beamview_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    beamview_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Push fanout ---
    let gateway: Arc<dyn PushGateway> = Arc::new(HttpPushGateway::new(
        &config.push.gateway_url,
        &config.push.secret,
    ));
    let fanout = Arc::new(
        PushFanoutService::new(Arc::clone(&gateway)).with_concurrency(config.push.concurrency),
    );
    tracing::info!(gateway_url = %config.push.gateway_url, "Push fanout configured");

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    let notifier = Arc::new(ConfigChangeNotifier::new(Arc::clone(&event_bus)));
    tracing::info!("Event bus created");

    // --- Sync services ---
    let store: Arc<dyn PlaylistStore> = Arc::new(PgPlaylistStore::new(pool.clone()));
    let cache = Arc::new(DefaultPlaylistCache::new(Arc::clone(&store)));
    let resolver = Arc::new(PlaylistResolver::new(
        Arc::clone(&store),
        Arc::clone(&cache),
    ));
    let engine = Arc::new(BulkAssignmentEngine::new(
        Arc::clone(&store),
        Arc::clone(&fanout),
        Arc::clone(&notifier),
    ));

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        store,
        cache,
        resolver,
        fanout,
        event_bus,
        notifier,
        engine,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
