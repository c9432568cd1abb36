use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;

mod extract;
mod handlers;
mod routes;
mod state;

use common::config::Settings;
use common::db::{DbPool, RedisPool};
use common::telemetry;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration must load before anything else starts
    let config = Arc::new(Settings::load()?);

    telemetry::init_logging(&config)?;
    tracing::info!(
        project = %config.project_name,
        environment = %config.environment,
        host = %config.server_host,
        port = %config.server_port,
        "Configuration loaded"
    );

    let metrics_handle = telemetry::init_metrics()?;

    // Initialize database connection pool
    let db_pool = DbPool::new(&config).await?;
    tracing::info!("Database connection pool established");

    db_pool.run_migrations().await?;

    let redis = RedisPool::new(&config)?;

    let state = AppState::new(db_pool.clone(), redis, metrics_handle, config.clone());

    // Create router
    let app = routes::create_router(state);

    // Start server
    let listener = bind_listener(&config).await?;
    tracing::info!(addr = %listener.local_addr()?, "Starting HTTP server");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    tracing::info!("API server stopped");
    Ok(())
}

/// Bind the HTTP listener. `SERVER_HOST` may be an IP address or a hostname
/// such as `localhost`; hostnames are resolved and the first usable address wins.
async fn bind_listener(config: &Settings) -> std::io::Result<TcpListener> {
    TcpListener::bind((config.server_host.as_str(), config.server_port)).await
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Initiating graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_with_host(host: &str) -> Settings {
        let vars: HashMap<String, String> = [
            ("POSTGRES_USER", "reviewer"),
            ("POSTGRES_PASSWORD", "secret"),
            ("POSTGRES_DB", "reviews"),
            ("POSTGRES_HOST", "localhost"),
            ("POSTGRES_PORT", "5432"),
            ("REDIS_HOST", "localhost"),
            ("REDIS_PORT", "6379"),
            ("REDIS_PASSWORD", "redis"),
            ("SERVER_HOST", host),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let mut settings = Settings::load_from_vars(vars).unwrap();
        // Let the OS pick a free port
        settings.server_port = 0;
        settings
    }

    #[tokio::test]
    async fn test_bind_listener_accepts_hostname() {
        let listener = bind_listener(&settings_with_host("localhost")).await.unwrap();
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }

    #[tokio::test]
    async fn test_bind_listener_accepts_ip_address() {
        let listener = bind_listener(&settings_with_host("127.0.0.1")).await.unwrap();
        assert_eq!(listener.local_addr().unwrap().ip().to_string(), "127.0.0.1");
    }
}
