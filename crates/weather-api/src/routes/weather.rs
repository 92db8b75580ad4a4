use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;
use weather_db::{weather, WeatherRecord, WeatherUpdate};

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::records;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validation::{parse_id, validate_location, validate_update};

#[derive(Debug, Deserialize)]
pub struct CreateWeatherRequest {
    pub city: String,
    pub country: String,
}

/// All stored records, newest first
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<WeatherRecord>>>, AppError> {
    let records = weather::find_all(&state.pool).await?;
    Ok(ApiResponse::ok(records, ""))
}

/// Geolocate the city, fetch its current conditions and store them
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateWeatherRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<WeatherRecord>>, AppError> {
    let Json(body) = payload?;
    validate_location(&body.city, &body.country)?;
    let (city, country) = (body.city.trim(), body.country.trim());

    let coords = state.weather.geolocation(city, country).await?;
    let snapshot = state.weather.current_weather(coords.lat, coords.lon).await?;
    let record = weather::create(&state.pool, &snapshot).await?;

    info!(
        id = %record.id,
        city = %record.city_name,
        user_id = %user.user.id,
        "Stored weather record"
    );
    Ok(ApiResponse::ok(record, "Weather data added successfully"))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<WeatherRecord>>, AppError> {
    let id = parse_id(&id)?;
    let record = records::find(&state.pool, &state.cache, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Weather record not found".into()))?;
    Ok(ApiResponse::ok(record, ""))
}

pub async fn update(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<WeatherUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<WeatherRecord>>, AppError> {
    let id = parse_id(&id)?;
    let Json(changes) = payload?;
    validate_update(&changes)?;

    let record = records::update(&state.pool, &state.cache, id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Weather record not found".into()))?;
    Ok(ApiResponse::ok(record, "Weather record updated successfully"))
}

pub async fn delete(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let id = parse_id(&id)?;
    if !records::delete(&state.pool, &state.cache, id).await? {
        return Err(AppError::NotFound("Weather record not found".into()));
    }
    info!(%id, "Deleted weather record");
    Ok(ApiResponse::ok((), "Weather record deleted successfully"))
}
