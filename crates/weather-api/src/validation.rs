use crate::error::AppError;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;
use weather_db::WeatherUpdate;

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Validate that a string's length (in characters, ignoring surrounding
/// whitespace) falls within the given range (inclusive).
pub fn validate_string_length(
    value: &str,
    min: usize,
    max: usize,
    field: &'static str,
) -> Result<(), FieldError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(FieldError {
            field,
            message: format!("{field} must be {min}-{max} characters"),
        });
    }
    Ok(())
}

/// Collapse field checks into a single 400 listing every failure
pub fn collect<I>(checks: I) -> Result<(), AppError>
where
    I: IntoIterator<Item = Result<(), FieldError>>,
{
    let errors: Vec<FieldError> = checks.into_iter().filter_map(Result::err).collect();
    if errors.is_empty() {
        return Ok(());
    }
    Err(AppError::Validation {
        message: "Validation failed".to_string(),
        details: Some(json!(errors)),
    })
}

/// Parse a record id from a path segment
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation {
        message: "Validation failed".to_string(),
        details: Some(json!([{ "field": "id", "message": "id must be a UUID" }])),
    })
}

/// `city` and `country` of a create request
pub fn validate_location(city: &str, country: &str) -> Result<(), AppError> {
    collect([
        validate_string_length(city, 1, 100, "city"),
        validate_string_length(country, 1, 100, "country"),
    ])
}

pub fn validate_update(update: &WeatherUpdate) -> Result<(), AppError> {
    if update.is_empty() {
        return Err(AppError::validation("At least one field must be provided"));
    }
    collect([
        update
            .main
            .as_deref()
            .map_or(Ok(()), |v| validate_string_length(v, 1, 50, "main")),
        update
            .description
            .as_deref()
            .map_or(Ok(()), |v| validate_string_length(v, 1, 100, "description")),
    ])
}
