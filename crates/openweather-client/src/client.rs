//! OpenWeather HTTP client

use crate::error::{ProviderError, Result};
use crate::types::{Coordinates, CurrentWeatherResponse, GeoResult, WeatherSnapshot};
use crate::units::{icon_url, IconSize};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings shared by every call
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    /// `standard`, `metric` or `imperial`
    pub units: String,
    pub lang: String,
}

impl ClientConfig {
    /// Defaults: public endpoint, 10s timeout, metric units, English
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            units: "metric".to_string(),
            lang: "en".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Client for the geocoding and current conditions endpoints
pub struct OpenWeatherClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl OpenWeatherClient {
    pub fn new(config: ClientConfig) -> std::result::Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve a city and country code to coordinates, taking the first match.
    ///
    /// An empty result set and a provider 404 both mean the location does not
    /// exist and are reported as a 400.
    pub async fn geolocation(&self, city: &str, country: &str) -> Result<Coordinates> {
        let query = format!("{city},{country}");
        let results: Vec<GeoResult> = self
            .get_json("/geo/1.0/direct", &[("q", query.as_str())])
            .await
            .map_err(|e| match e.status() {
                404 => ProviderError::location_not_found(),
                _ => e,
            })?;

        match results.into_iter().next() {
            Some(first) => {
                debug!(city, country, lat = first.lat, lon = first.lon, "Geolocated city");
                Ok(Coordinates {
                    lat: first.lat,
                    lon: first.lon,
                })
            }
            None => Err(ProviderError::location_not_found()),
        }
    }

    /// Fetch current conditions at a point
    pub async fn current_weather(&self, lat: f64, lon: f64) -> Result<WeatherSnapshot> {
        let (lat_param, lon_param) = (lat.to_string(), lon.to_string());
        let data: CurrentWeatherResponse = self
            .get_json(
                "/data/2.5/weather",
                &[("lat", lat_param.as_str()), ("lon", lon_param.as_str())],
            )
            .await?;

        let snapshot = to_snapshot(data)?;
        debug!(
            lat,
            lon,
            city = %snapshot.city_name,
            temperature = snapshot.temperature,
            "Fetched current weather"
        );
        Ok(snapshot)
    }

    /// GET `path` with the given parameters plus key, units and language
    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &[(&str, &str)]) -> Result<T> {
        let url = self.build_url(path, params);
        debug!(path, "Requesting OpenWeather");

        let response = self.http.get(&url).send().await.map_err(|e| {
            warn!(path, error = %e, "OpenWeather request failed");
            ProviderError::unreachable()
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<serde_json::Value>().await.ok();
            let err = ProviderError::from_status(status.as_u16(), body);
            warn!(path, status = status.as_u16(), error = %err, "OpenWeather returned an error");
            return Err(err);
        }

        let bytes = response.bytes().await.map_err(|e| {
            warn!(path, error = %e, "Failed to read OpenWeather response");
            ProviderError::unreachable()
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path, error = %e, "Failed to decode OpenWeather response");
            ProviderError::undecodable()
        })
    }

    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String {
        let common = [
            ("appid", self.config.api_key.as_str()),
            ("units", self.config.units.as_str()),
            ("lang", self.config.lang.as_str()),
        ];
        let query: Vec<String> = params
            .iter()
            .chain(common.iter())
            .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
            .collect();
        format!(
            "{}{}?{}",
            self.config.base_url.trim_end_matches('/'),
            path,
            query.join("&")
        )
    }
}

fn to_snapshot(data: CurrentWeatherResponse) -> Result<WeatherSnapshot> {
    let Some(condition) = data.weather.into_iter().next() else {
        warn!("OpenWeather response has no weather conditions");
        return Err(ProviderError::undecodable());
    };

    Ok(WeatherSnapshot {
        city_name: data.name,
        country: data.sys.country,
        lat: data.coord.lat,
        lon: data.coord.lon,
        main: condition.main,
        description: condition.description,
        temperature: round_degrees(data.main.temp),
        feels_like: round_degrees(data.main.feels_like),
        min_temperature: round_degrees(data.main.temp_min),
        max_temperature: round_degrees(data.main.temp_max),
        pressure: data.main.pressure,
        humidity: data.main.humidity,
        wind_speed: data.wind.speed,
        wind_direction: data.wind.deg,
        clouds: data.clouds.all,
        icon_url: condition
            .icon
            .as_deref()
            .map(|icon| icon_url(icon, IconSize::default())),
        fetched_at: Utc::now(),
    })
}

/// Nearest whole degree, halves rounded up (`-2.5` becomes `-2`)
fn round_degrees(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
