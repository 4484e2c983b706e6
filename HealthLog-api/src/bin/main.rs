use std::net::SocketAddr;

use anyhow::{Context, Result};
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use health_log_api::api::create_application;
use health_log_api::config::AppConfig;
use health_log_domain::database;
use health_log_domain::services::Services;
use health_log_domain::Repositories;

/// The main entry point for the HealthLog API server
///
/// Loads `.env`, sets up tracing, opens the SQLite pool (falling back to
/// in-memory repositories when it cannot be opened) and serves the router
/// until Ctrl+C or SIGTERM.
#[tokio::main]
async fn main() -> Result<()> {
    if dotenv().is_err() {
        eprintln!("Warning: .env file not found or couldn't be read. Using environment variables.");
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stdout),
        )
        .with(env_filter)
        .init();

    info!("Starting HealthLog API server");

    let config = AppConfig::from_env()?;

    if !config.data_dir.exists() {
        info!("Creating data directory: {}", config.data_dir.display());
        std::fs::create_dir_all(&config.data_dir).with_context(|| {
            format!("failed to create data directory {}", config.data_dir.display())
        })?;
    }

    if std::env::var("DB_SQLITE_PATH").is_err() {
        let db_path = config.database_path();
        std::env::set_var("DB_SQLITE_PATH", db_path.to_string_lossy().to_string());
        info!("Set DB_SQLITE_PATH to {}", db_path.display());
    }

    let services = match database::initialize_database_pool() {
        Ok(pool) => {
            info!("Database pool initialized successfully");
            Services::sqlite(pool, config.jwt.clone(), config.bcrypt_cost)
        }
        Err(e) => {
            error!("Failed to initialize database pool: {}", e);
            warn!("Falling back to in-memory repositories; data will not persist");
            Services::new(
                Repositories::in_memory(),
                None,
                config.jwt.clone(),
                config.bcrypt_cost,
            )
        }
    };

    let app = create_application(services, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on Unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down server...");
}
