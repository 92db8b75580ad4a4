//! Weather record reads and writes with by-id caching

use sqlx::PgPool;
use uuid::Uuid;
use weather_cache::{keys, CacheAside, CacheEvict, Cacheable};
use weather_db::{weather, WeatherRecord, WeatherUpdate};

fn record_key(id: &Uuid) -> String {
    keys::current_by_id(&id.to_string())
}

/// Record by id, cached under `weather:current:uuid:{id}` with the default TTL.
/// Unknown ids are not cached.
pub async fn find(
    pool: &PgPool,
    cache: &CacheAside,
    id: Uuid,
) -> Result<Option<WeatherRecord>, sqlx::Error> {
    let lookup = Cacheable::new(cache.clone(), record_key, move |id: Uuid| async move {
        weather::find_by_id(pool, id).await
    });
    lookup.call_optional(id).await
}

/// Partially update a record and evict its cached copy
pub async fn update(
    pool: &PgPool,
    cache: &CacheAside,
    id: Uuid,
    changes: WeatherUpdate,
) -> Result<Option<WeatherRecord>, sqlx::Error> {
    let mutation = CacheEvict::new(
        cache.clone(),
        |(id, _): &(Uuid, WeatherUpdate)| [record_key(id)],
        move |(id, changes): (Uuid, WeatherUpdate)| async move {
            weather::update(pool, id, &changes).await
        },
    );
    mutation.call((id, changes)).await
}

/// Delete a record and evict its cached copy
pub async fn delete(pool: &PgPool, cache: &CacheAside, id: Uuid) -> Result<bool, sqlx::Error> {
    let mutation = CacheEvict::new(
        cache.clone(),
        |id: &Uuid| [record_key(id)],
        move |id: Uuid| async move { weather::delete(pool, id).await },
    );
    mutation.call(id).await
}
