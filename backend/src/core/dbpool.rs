use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

use crate::cfg;

pub type DbContext = sqlx::SqlitePool;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Invalid database URL: {0}")]
    InvalidUrl(sqlx::Error),

    #[error("Database connection error: {0}")]
    ConnectionFailed(sqlx::Error),
}

pub async fn create_db_context(db_settings: &cfg::DatabaseSettings) -> Result<DbContext, DbError> {
    let options = SqliteConnectOptions::from_str(&db_settings.url)
        .map_err(DbError::InvalidUrl)?
        .create_if_missing(true)
        .foreign_keys(true)
        // Increase SQLite busy timeout to handle concurrent connections better
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(db_settings.max_connections)
        .connect_with(options)
        .await
        .map_err(DbError::ConnectionFailed)?;

    tracing::info!("Database initialized successfully");
    Ok(pool)
}
