//! Weather API
//!
//! REST service that geolocates cities, fetches their current conditions from
//! OpenWeather through a read-through cache and stores the results in Postgres.

pub mod auth;
pub mod config;
pub mod error;
pub mod provider;
pub mod records;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;
pub mod validation;

pub use config::{Config, ConfigError};
pub use error::AppError;
pub use server::{connect_store, create_router, shutdown_signal, start_server};
pub use state::AppState;
