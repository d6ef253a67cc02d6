//! Application builder: wires backends, services and the router into an
//! Axum app.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use classhub_auth::{JoinTokenMinter, JwtDecoder};
use classhub_cache::CacheManager;
use classhub_core::config::AppConfig;
use classhub_core::error::AppError;
use classhub_core::traits::cache::CacheProvider;
use classhub_core::traits::presence::PresenceStore;
use classhub_core::traits::storage::ObjectStorage;
use classhub_database::{ChatStore, DatabasePool, LiveRoomStore, MemoryStore, PgStore};
use classhub_realtime::RealtimeEngine;
use classhub_service::{ConversationService, LiveRoomManager};
use classhub_storage::{SignedUrlCache, StorageManager};

use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// The external collaborators the services run against.
#[derive(Debug, Clone)]
pub struct Backends {
    /// Conversation store.
    pub chat: Arc<dyn ChatStore>,
    /// Live room store. Usually the same object as `chat`.
    pub rooms: Arc<dyn LiveRoomStore>,
    /// TTL cache for presence keys and signed URLs.
    pub cache: Arc<CacheManager>,
    /// Object storage signer.
    pub storage: Arc<dyn ObjectStorage>,
}

impl Backends {
    /// Connect the providers named in configuration.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        // ── Step 1: Conversation store ──────────────────────────────
        info!(provider = %config.database.provider, "Initializing conversation store");
        let (chat, rooms): (Arc<dyn ChatStore>, Arc<dyn LiveRoomStore>) =
            match config.database.provider.as_str() {
                "postgres" => {
                    let db = DatabasePool::connect(&config.database).await?;
                    if config.database.run_migrations {
                        info!("Running database migrations...");
                        classhub_database::migration::run_migrations(db.pool()).await?;
                    }
                    let store = Arc::new(PgStore::new(db));
                    (store.clone() as Arc<dyn ChatStore>, store as Arc<dyn LiveRoomStore>)
                }
                "memory" => {
                    let store = Arc::new(MemoryStore::new());
                    (store.clone() as Arc<dyn ChatStore>, store as Arc<dyn LiveRoomStore>)
                }
                other => {
                    return Err(AppError::configuration(format!(
                        "Unknown database provider: '{other}'. Supported: postgres, memory"
                    )));
                }
            };

        // ── Step 2: Cache ───────────────────────────────────────────
        info!(provider = %config.cache.provider, "Initializing cache");
        let cache = Arc::new(CacheManager::new(&config.cache).await?);

        // ── Step 3: Object storage ──────────────────────────────────
        info!(provider = %config.storage.provider, "Initializing object storage");
        let storage: Arc<dyn ObjectStorage> = Arc::new(StorageManager::new(&config.storage).await?);

        Ok(Self {
            chat,
            rooms,
            cache,
            storage,
        })
    }
}

/// Build services and the realtime engine over the given backends.
pub fn build_state(config: AppConfig, backends: Backends) -> AppState {
    let Backends {
        chat,
        rooms,
        cache,
        storage,
    } = backends;

    let url_cache: Arc<dyn CacheProvider> = cache.clone();
    let urls = SignedUrlCache::new(
        Arc::clone(&storage),
        url_cache,
        Duration::from_secs(config.storage.signed_url_ttl_seconds),
    );

    let conversations = ConversationService::new(
        Arc::clone(&chat),
        storage,
        urls,
        config.realtime.page_size,
    );

    let presence: Arc<dyn PresenceStore> = cache.clone();
    let live = LiveRoomManager::new(
        rooms,
        Arc::clone(&chat),
        presence,
        JoinTokenMinter::new(&config.live),
        &config.live,
    );

    let realtime = RealtimeEngine::new(
        config.realtime.clone(),
        conversations.clone(),
        live.clone(),
    );

    AppState {
        jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
        config: Arc::new(config),
        conversations,
        live,
        realtime,
        store: chat,
        cache,
        started_at: Instant::now(),
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Runs the ClassHub server until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> Result<(), AppError> {
    info!("Starting ClassHub server...");

    let backends = Backends::connect(&config).await?;
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let state = build_state(config, backends);
    let realtime = state.realtime.clone();
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(addr = %addr, "ClassHub listening");

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.changed().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => return server_result(result),
        _ = shutdown_signal() => {}
    }

    info!("Shutdown signal received, closing connections");
    realtime.close_all();
    let _ = shutdown_tx.send(true);

    // The grace period bounds the wait for in-flight HTTP requests.
    match tokio::time::timeout(grace, &mut server).await {
        Ok(result) => server_result(result)?,
        Err(_) => {
            warn!(grace_seconds = grace.as_secs(), "Graceful shutdown timed out");
            server.abort();
        }
    }

    info!("ClassHub server stopped");
    Ok(())
}

fn server_result(
    result: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(AppError::internal(format!("Server error: {e}"))),
        Err(e) => Err(AppError::internal(format!("Server task failed: {e}"))),
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
