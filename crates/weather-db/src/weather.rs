use crate::types::{WeatherRecord, WeatherUpdate};
use openweather_client::WeatherSnapshot;
use sqlx::PgPool;
use uuid::Uuid;

const COLUMNS: &str = r#"
    id, city_name, country, lat, lon, main, description,
    temperature, feels_like, min_temperature, max_temperature,
    pressure, humidity, wind_speed, wind_direction, clouds, icon_url,
    fetched_at, created_at, updated_at
"#;

/// Persist a freshly fetched snapshot
pub async fn create(pool: &PgPool, s: &WeatherSnapshot) -> Result<WeatherRecord, sqlx::Error> {
    let query = format!(
        r#"
        INSERT INTO current_weather_data (
            city_name, country, lat, lon, main, description,
            temperature, feels_like, min_temperature, max_temperature,
            pressure, humidity, wind_speed, wind_direction, clouds, icon_url, fetched_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, WeatherRecord>(&query)
        .bind(&s.city_name)
        .bind(&s.country)
        .bind(s.lat)
        .bind(s.lon)
        .bind(&s.main)
        .bind(&s.description)
        .bind(s.temperature)
        .bind(s.feels_like)
        .bind(s.min_temperature)
        .bind(s.max_temperature)
        .bind(s.pressure)
        .bind(s.humidity)
        .bind(s.wind_speed)
        .bind(s.wind_direction)
        .bind(s.clouds)
        .bind(&s.icon_url)
        .bind(s.fetched_at)
        .fetch_one(pool)
        .await
}

/// Get a record by id
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<WeatherRecord>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM current_weather_data WHERE id = $1");
    sqlx::query_as::<_, WeatherRecord>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All records, newest first
pub async fn find_all(pool: &PgPool) -> Result<Vec<WeatherRecord>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM current_weather_data ORDER BY created_at DESC");
    sqlx::query_as::<_, WeatherRecord>(&query)
        .fetch_all(pool)
        .await
}

/// Apply a partial update, returning the updated record or `None` if the id is unknown
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    u: &WeatherUpdate,
) -> Result<Option<WeatherRecord>, sqlx::Error> {
    let query = format!(
        r#"
        UPDATE current_weather_data SET
            main = COALESCE($2, main),
            description = COALESCE($3, description),
            temperature = COALESCE($4, temperature),
            feels_like = COALESCE($5, feels_like),
            min_temperature = COALESCE($6, min_temperature),
            max_temperature = COALESCE($7, max_temperature),
            pressure = COALESCE($8, pressure),
            humidity = COALESCE($9, humidity),
            wind_speed = COALESCE($10, wind_speed),
            wind_direction = COALESCE($11, wind_direction),
            clouds = COALESCE($12, clouds),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {COLUMNS}
        "#
    );
    sqlx::query_as::<_, WeatherRecord>(&query)
        .bind(id)
        .bind(&u.main)
        .bind(&u.description)
        .bind(u.temperature)
        .bind(u.feels_like)
        .bind(u.min_temperature)
        .bind(u.max_temperature)
        .bind(u.pressure)
        .bind(u.humidity)
        .bind(u.wind_speed)
        .bind(u.wind_direction)
        .bind(u.clouds)
        .fetch_optional(pool)
        .await
}

/// Delete a record, returning whether it existed
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM current_weather_data WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
