//! OpenWeather Client
//!
//! A Rust client for the [OpenWeather](https://openweathermap.org/api) direct
//! geocoding and current weather endpoints. Every failure is mapped to a
//! [`ProviderError`] carrying the HTTP status the calling API should answer with.

mod client;
mod error;
mod types;
mod units;

pub use client::{ClientConfig, OpenWeatherClient};
pub use error::{ProviderError, ProviderErrorKind, Result};
pub use types::{Coordinates, WeatherSnapshot};
pub use units::{icon_url, IconSize};
