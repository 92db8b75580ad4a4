use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;
use std::sync::Arc;
use weather_cache::CacheAside;

use crate::auth::JwtVerifier;
use crate::provider::WeatherProvider;

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub cache: CacheAside,
    pub weather: Arc<WeatherProvider>,
    pub jwt: Arc<JwtVerifier>,
    pub started_at: DateTime<Utc>,
}
