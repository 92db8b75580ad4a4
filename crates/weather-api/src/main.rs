//! Weather API server

use chrono::Utc;
use openweather_client::OpenWeatherClient;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};
use weather_api::auth::JwtVerifier;
use weather_api::provider::WeatherProvider;
use weather_api::{connect_store, create_router, shutdown_signal, start_server, AppState, Config};
use weather_cache::CacheAside;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive("weather_api=info".parse()?);

    // Use JSON format for GCP Cloud Logging when LOG_FORMAT=json
    if std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false)
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_stackdriver::layer())
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    };

    if let Err(e) = dotenv {
        debug!("No .env file loaded: {}", e);
    }

    let config = Config::from_env()?;
    info!(port = config.port, "Starting weather-api");

    // Connect to database
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    weather_db::migrate(&pool).await?;

    // Cache store; the service keeps running uncached if it is down
    let store = connect_store(&config.cache).await?;
    if store.ping().await {
        info!(backend = store.backend(), "Cache store is reachable");
    } else {
        warn!(backend = store.backend(), "Cache store is not responding, continuing uncached");
    }
    let cache = CacheAside::new(store.clone())
        .with_default_ttl(config.cache.default_ttl)
        .with_timeout(config.cache.op_timeout);

    let client = OpenWeatherClient::new(config.openweather.clone())?;

    let state = AppState {
        pool: pool.clone(),
        cache: cache.clone(),
        weather: Arc::new(WeatherProvider::new(client, cache)),
        jwt: Arc::new(JwtVerifier::new(&config.jwt_secret)),
        started_at: Utc::now(),
    };

    let router = create_router(state, &config.cors_origins);
    start_server(router, config.port, shutdown_signal()).await?;

    if let Err(e) = store.close().await {
        warn!(error = %e, "Failed to close cache store");
    }
    pool.close().await;
    info!("Shut down cleanly");
    Ok(())
}
