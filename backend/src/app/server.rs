use std::error::Error;
use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app;
use crate::auth;
use crate::cfg;
use crate::core;
use crate::db;
use crate::services::signer;

/// Application-level error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigLoadingFailed(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    DatabaseOperationFailed(#[from] core::DbError),

    #[error("Migration error: {0}")]
    MigrationFailed(#[from] app::MigrationError),

    #[error("CLI error: {0}")]
    CliOperationFailed(#[from] app::CliError),

    #[error("JWT setup error: {0}")]
    JwtSetupFailed(#[from] auth::JwtError),

    #[error("URL signer setup error: {0}")]
    SignerSetupFailed(#[from] signer::SignerError),

    #[error("Network address parsing error: {0}")]
    AddressParsingFailed(#[from] std::net::AddrParseError),

    #[error("Server error: {0}")]
    ServerStartingFailed(#[from] std::io::Error),
}

pub async fn run() {
    if let Err(e) = run_app().await {
        eprintln!("❌ {e}\n");

        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("Caused by: {err}");
            source = err.source();
        }

        std::process::exit(1);
    }
}

async fn run_app() -> Result<(), AppError> {
    let settings = cfg::AppSettings::new()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&settings.server.log_directives))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let context = create_context(settings).await?;

    // run the CLI instead of the server when a migrate command was given
    if app::run_cli(&context).await? {
        return Ok(());
    }

    app::run_migrations(&context.store.db).await?;

    let server_address = context.settings.get_server_address();
    let address = server_address.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!("🚀 starting server");
    tracing::info!("   app_env: {}", cfg::AppSettings::get_app_run_env());
    tracing::info!("   cfg_dir: {}", cfg::AppSettings::get_config_full_path());
    tracing::info!("   logging: {}", context.settings.server.log_directives);
    tracing::info!("   signer:  {:?}", context.settings.streaming.signer);
    tracing::info!("   address: http://{server_address}");

    let router = app::create_router(context);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wires the store, token context and URL signer from the loaded settings.
pub async fn create_context(settings: cfg::AppSettings) -> Result<core::ArcContext, AppError> {
    let secret = if settings.jwt.secret.is_empty() {
        auth::get_jwt_secret()?
    } else {
        settings.jwt.secret.clone()
    };

    let db = core::create_db_context(&settings.database).await?;
    let jwt = auth::JwtContext::new(&settings.jwt, &secret)?;
    let signer = signer::build_signer(&settings.streaming, &secret)?;
    Ok(core::Context::new(db::Store::new(db), jwt, signer, settings))
}

/// Tokio signal handler that will wait for a user to press CTRL+C.
/// We use this in our `Server` method `with_graceful_shutdown`.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, shutting down gracefully"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}
