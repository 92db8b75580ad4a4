use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use openweather_client::ProviderError;
use serde_json::{json, Value};

/// Application error type that converts to HTTP responses
#[derive(Debug)]
pub enum AppError {
    /// Request failed validation; `details` lists the offending fields
    Validation {
        message: String,
        details: Option<Value>,
    },
    Unauthorized(&'static str),
    NotFound(String),
    /// The weather provider call failed; status and message come from the mapping
    Provider(ProviderError),
    Internal(String),
    Database(sqlx::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Validation { message, details } => (StatusCode::BAD_REQUEST, message, details),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string(), None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            AppError::Provider(e) => {
                tracing::warn!(status = e.status(), kind = ?e.kind(), error = %e, "Weather provider error");
                let status =
                    StatusCode::from_u16(e.status()).unwrap_or(StatusCode::BAD_GATEWAY);
                (status, e.message().to_string(), e.details().cloned())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                    None,
                )
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".into(),
                    None,
                )
            }
        };

        let mut body = json!({ "success": false, "message": message });
        if let Some(details) = details {
            body["details"] = details;
        }
        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e)
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        AppError::Provider(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}
