use std::fs::File;
use std::io::Write;
use std::path::Path;

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError as SqlxMigrateError;
use thiserror::Error;

use crate::core::DbContext;

#[rustfmt::skip]
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Failed to run embedded migrations")]
    EmbeddedMigrationFailed { source: SqlxMigrateError },

    #[error("No migrations applied yet")]
    NoMigrationsApplied,

    #[error("Failed to fetch applied migrations")]
    FetchAppliedMigrationsFailed { #[from] source: SqlxError },

    #[error("File system error")]
    FileSystemOperationFailed { #[from] source: std::io::Error },
}

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// List all embedded migrations
#[must_use]
pub fn list_migrations() -> Vec<String> {
    MIGRATOR
        .iter()
        .map(|m| format!("{} {}", m.version, m.description))
        .collect::<Vec<_>>()
}

/// Runs the embedded migrations
pub async fn run_migrations(db: &DbContext) -> Result<(), MigrationError> {
    MIGRATOR
        .run(db)
        .await
        .map_err(|e| MigrationError::EmbeddedMigrationFailed { source: e })?;
    tracing::info!("Database migrations completed successfully.");
    Ok(())
}

/// Check if migrations need to be applied
pub async fn check_pending_migrations(db: &DbContext) -> Result<bool, MigrationError> {
    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success = 1")
        .fetch_all(db)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(e) if e.message().contains("no such table") => MigrationError::NoMigrationsApplied,
            _ => MigrationError::FetchAppliedMigrationsFailed { source: err },
        })?;
    Ok(MIGRATOR.iter().any(|m| !applied.contains(&m.version)))
}

/// Create a new migration file with the current timestamp
pub fn create_migration(name: &str) -> Result<String, MigrationError> {
    // Create migrations directory if it doesn't exist
    let migrations_path = Path::new("migrations");
    if !migrations_path.exists() {
        std::fs::create_dir_all(migrations_path)?;
    }

    // sqlx orders migrations by the leading integer version
    let timestamp = chrono::Utc::now().format("%Y%m%d%H%M%S").to_string();
    let normalized_name = name.trim().replace(' ', "_").to_lowercase();
    let filename = format!("{timestamp}_{normalized_name}.sql");
    let filepath = migrations_path.join(&filename);

    let mut file = File::create(&filepath)?;
    writeln!(file, "-- Migration: {name}")?;
    writeln!(file, "--")?;
    writeln!(file, "-- Add migration script here")?;

    tracing::info!("Created new migration file: {}.", filepath.display());
    Ok(filename)
}
