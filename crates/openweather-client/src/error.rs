//! Error taxonomy for OpenWeather calls

use serde_json::Value;
use std::fmt;

/// What went wrong talking to the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// The provider rejected the request parameters (400)
    InvalidRequest,
    /// Bad or missing API key (401)
    Unauthorized,
    /// No match for the query
    NotFound,
    /// Provider rate limit hit (429)
    RateLimited,
    /// Provider answered with a 5xx
    Unavailable,
    /// No response at all: connect failure or timeout
    Unreachable,
    /// Any other unexpected status, or a body we could not decode
    Upstream,
}

/// A failed provider call, already mapped to the status the API should answer with
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    status: u16,
    message: String,
    details: Option<Value>,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Map a non-success provider status and its (optional) JSON body
    pub fn from_status(status: u16, body: Option<Value>) -> Self {
        match status {
            400 => {
                let err = Self::new(
                    ProviderErrorKind::InvalidRequest,
                    400,
                    "Invalid request parameters",
                );
                match body {
                    Some(body) => err.with_details(body),
                    None => err,
                }
            }
            401 => Self::new(ProviderErrorKind::Unauthorized, 401, "Invalid API key"),
            404 => Self::new(ProviderErrorKind::NotFound, 404, "City not found"),
            429 => Self::new(ProviderErrorKind::RateLimited, 429, "API rate limit exceeded"),
            500 | 502 | 503 | 504 => Self::new(
                ProviderErrorKind::Unavailable,
                503,
                "Weather service is temporarily unavailable",
            ),
            other => {
                let reason = body
                    .as_ref()
                    .and_then(|b| b.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error");
                Self::new(
                    ProviderErrorKind::Upstream,
                    other,
                    format!("Weather API error: {reason}"),
                )
            }
        }
    }

    /// Geolocation found nothing for the query
    pub fn location_not_found() -> Self {
        Self::new(ProviderErrorKind::NotFound, 400, "Location does not exist")
    }

    pub fn unreachable() -> Self {
        Self::new(
            ProviderErrorKind::Unreachable,
            503,
            "Unable to connect to weather service",
        )
    }

    pub fn undecodable() -> Self {
        Self::new(
            ProviderErrorKind::Upstream,
            502,
            "Weather API returned an unexpected response",
        )
    }

    pub fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    /// HTTP status the API layer should respond with
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Provider payload, only kept for rejected request parameters
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.status)
    }
}

impl std::error::Error for ProviderError {}

pub type Result<T> = std::result::Result<T, ProviderError>;
