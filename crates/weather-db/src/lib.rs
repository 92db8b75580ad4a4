//! Postgres persistence for the weather backend

pub mod migrate;
pub mod types;
pub mod users;
pub mod weather;

pub use migrate::migrate;
pub use sqlx::postgres::PgPool;
pub use types::*;
