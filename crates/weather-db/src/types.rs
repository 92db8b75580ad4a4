use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted current-conditions snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub id: Uuid,
    pub city_name: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    pub main: String,
    pub description: String,
    pub temperature: i32,
    pub feels_like: i32,
    pub min_temperature: i32,
    pub max_temperature: i32,
    pub pressure: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub clouds: f64,
    pub icon_url: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of the weather fields of a record; `None` leaves a column as is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherUpdate {
    pub main: Option<String>,
    pub description: Option<String>,
    pub temperature: Option<i32>,
    pub feels_like: Option<i32>,
    pub min_temperature: Option<i32>,
    pub max_temperature: Option<i32>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub clouds: Option<f64>,
}

impl WeatherUpdate {
    /// True when no field would change
    pub fn is_empty(&self) -> bool {
        self.main.is_none()
            && self.description.is_none()
            && self.temperature.is_none()
            && self.feels_like.is_none()
            && self.min_temperature.is_none()
            && self.max_temperature.is_none()
            && self.pressure.is_none()
            && self.humidity.is_none()
            && self.wind_speed.is_none()
            && self.wind_direction.is_none()
            && self.clouds.is_none()
    }
}

/// User profile; the password hash and refresh token are never selected
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
