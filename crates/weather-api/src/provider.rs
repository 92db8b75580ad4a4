//! Cached access to the weather provider

use openweather_client::{Coordinates, OpenWeatherClient, ProviderError, WeatherSnapshot};
use std::time::Duration;
use weather_cache::{keys, CacheAside, Cacheable};

/// City coordinates rarely change
pub const GEOLOCATION_TTL: Duration = Duration::from_secs(6000);
pub const CURRENT_WEATHER_TTL: Duration = Duration::from_secs(600);

/// OpenWeather client with read-through caching on both lookups
pub struct WeatherProvider {
    client: OpenWeatherClient,
    cache: CacheAside,
}

impl WeatherProvider {
    pub fn new(client: OpenWeatherClient, cache: CacheAside) -> Self {
        Self { client, cache }
    }

    /// Coordinates for a city, cached under `weather:coords:{city}:{country}`
    pub async fn geolocation(
        &self,
        city: &str,
        country: &str,
    ) -> Result<Coordinates, ProviderError> {
        let client = &self.client;
        let lookup = Cacheable::new(
            self.cache.clone(),
            |(city, country): &(String, String)| keys::city_coordinates(city, country),
            move |(city, country): (String, String)| async move {
                client.geolocation(&city, &country).await
            },
        )
        .with_ttl(GEOLOCATION_TTL);

        lookup.call((city.to_string(), country.to_string())).await
    }

    /// Current conditions at a point, cached under `weather:current:{lat}:{lon}`
    pub async fn current_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, ProviderError> {
        let client = &self.client;
        let lookup = Cacheable::new(
            self.cache.clone(),
            |&(lat, lon): &(f64, f64)| keys::current_by_coords(lat, lon),
            move |(lat, lon): (f64, f64)| async move { client.current_weather(lat, lon).await },
        )
        .with_ttl(CURRENT_WEATHER_TTL);

        lookup.call((lat, lon)).await
    }
}
