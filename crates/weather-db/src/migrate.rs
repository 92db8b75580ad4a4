use sqlx::PgPool;
use tracing::info;

/// Apply pending migrations from `migrations/`, embedded at compile time
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrator = sqlx::migrate!();
    info!(count = migrator.iter().count(), "Applying weather database migrations");
    migrator.run(pool).await?;
    info!("Weather database is up to date");
    Ok(())
}
