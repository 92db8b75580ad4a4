//! HTTP router and server lifecycle

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use weather_cache::{CacheError, CacheStore, MemoryStore};

use crate::config::{CacheBackend, CacheConfig};
use crate::routes;
use crate::state::AppState;

/// Create the HTTP router
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        // Weather records
        .route(
            "/api/weather",
            get(routes::weather::list).post(routes::weather::create),
        )
        .route(
            "/api/weather/{id}",
            get(routes::weather::get_one)
                .patch(routes::weather::update)
                .delete(routes::weather::delete),
        )
        // Auth
        .route("/api/auth/me", get(routes::auth::me))
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Permissive CORS when no origins (or `*`) are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Build the configured cache store
pub async fn connect_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheError> {
    match config.backend {
        CacheBackend::Memory => {
            info!(max_capacity = config.max_capacity, "Using in-memory cache");
            Ok(Arc::new(MemoryStore::with_capacity(config.max_capacity)))
        }
        #[cfg(feature = "redis")]
        CacheBackend::Redis => {
            let store =
                weather_cache::RedisStore::connect(&config.redis_url, &config.key_prefix).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis"))]
        CacheBackend::Redis => Err(CacheError::Backend(
            "CACHE_BACKEND=redis requires the `redis` feature".to_string(),
        )),
    }
}

/// Serve `router` on `port` until `shutdown` resolves
pub async fn start_server<F>(router: Router, port: u16, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
