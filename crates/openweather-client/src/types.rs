//! Public snapshot types and the provider's wire format

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A geolocation result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Current conditions at a point, reduced to the fields the API exposes.
///
/// Temperatures are whole degrees in the configured units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
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
    /// Condition icon at 2x, when the provider sent an icon code
    pub icon_url: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

// -- Wire types --

/// One entry of `/geo/1.0/direct`
#[derive(Debug, Deserialize)]
pub(crate) struct GeoResult {
    pub lat: f64,
    pub lon: f64,
}

/// `/data/2.5/weather` response
#[derive(Debug, Deserialize)]
pub(crate) struct CurrentWeatherResponse {
    pub coord: WireCoord,
    #[serde(default)]
    pub weather: Vec<WireCondition>,
    pub main: WireMain,
    #[serde(default)]
    pub wind: WireWind,
    #[serde(default)]
    pub clouds: WireClouds,
    #[serde(default)]
    pub sys: WireSys,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCoord {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCondition {
    pub main: String,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireMain {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireWind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireClouds {
    #[serde(default)]
    pub all: f64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireSys {
    #[serde(default)]
    pub country: String,
}
