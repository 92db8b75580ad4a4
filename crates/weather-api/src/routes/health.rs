use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use weather_cache::CacheStats;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheHealth {
    pub backend: &'static str,
    pub reachable: bool,
    #[serde(flatten)]
    pub stats: CacheStats,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` while the cache store is unreachable
    pub status: &'static str,
    pub uptime_secs: u64,
    pub cache: CacheHealth,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = state.cache.ping().await;
    let uptime_secs = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: if reachable { "ok" } else { "degraded" },
        uptime_secs,
        cache: CacheHealth {
            backend: state.cache.store().backend(),
            reachable,
            stats: state.cache.stats(),
        },
    })
}
