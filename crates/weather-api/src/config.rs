use openweather_client::ClientConfig;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Which cache store backs the cache-aside layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub redis_url: String,
    pub key_prefix: String,
    pub default_ttl: Duration,
    pub op_timeout: Duration,
    pub max_capacity: u64,
}

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub cors_origins: Vec<String>,
    pub openweather: ClientConfig,
    pub cache: CacheConfig,
    pub jwt_secret: String,
}

/// A required variable is missing or a value does not parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(name) => write!(f, "{name} must be set"),
            Self::Invalid { name, value } => write!(f, "Invalid value for {name}: {value:?}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Parse configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = parse_or(&var, "PORT", 3000)?;

        let database_url =
            var("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/weather".to_string());
        let database_max_connections = parse_or(&var, "DATABASE_MAX_CONNECTIONS", 10)?;

        let cors_origins = var("CORS_ORIGINS")
            .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
            .unwrap_or_default();

        let api_key = var("OPENWEATHER_API_KEY").ok_or(ConfigError::Missing("OPENWEATHER_API_KEY"))?;
        let mut openweather = ClientConfig::new(api_key);
        if let Some(base_url) = var("OPENWEATHER_BASE_URL") {
            openweather = openweather.with_base_url(base_url);
        }
        openweather.timeout = Duration::from_millis(parse_or(&var, "WEATHER_API_TIMEOUT_MS", 10_000)?);
        if let Some(units) = var("WEATHER_UNITS") {
            openweather.units = units;
        }
        if let Some(lang) = var("WEATHER_LANG") {
            openweather.lang = lang;
        }

        let backend = match var("CACHE_BACKEND").as_deref() {
            None | Some("memory") => CacheBackend::Memory,
            Some("redis") => CacheBackend::Redis,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "CACHE_BACKEND",
                    value: other.to_string(),
                })
            }
        };
        let cache = CacheConfig {
            backend,
            redis_url: var("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379/0".to_string()),
            key_prefix: var("REDIS_KEY_PREFIX").unwrap_or_else(|| "weather_app:".to_string()),
            default_ttl: Duration::from_secs(parse_or(&var, "CACHE_DEFAULT_TTL", 300)?),
            op_timeout: Duration::from_millis(parse_or(&var, "CACHE_TIMEOUT_MS", 500)?),
            max_capacity: parse_or(&var, "CACHE_MAX_CAPACITY", 10_000)?,
        };

        let jwt_secret = var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            cors_origins,
            openweather,
            cache,
            jwt_secret,
        })
    }
}

fn parse_or<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
