// Telemetry module for structured logging and metrics

use crate::config::{Environment, Settings};
use anyhow::Result;
use metrics::{describe_counter, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Console,
}

impl LogFormat {
    /// `dev` emits JSON lines for log shipping from the local stack,
    /// `prod` emits human-readable console output
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Dev => LogFormat::Json,
            Environment::Prod => LogFormat::Console,
        }
    }
}

/// Build the env filter: `RUST_LOG` when set, otherwise the configured level
pub fn env_filter(log_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to create env filter: {}", e))
}

/// Initialize the global tracing subscriber. Call once at startup.
///
/// Every record carries an ISO-8601 timestamp, level and target.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let filter = env_filter(&settings.log_level)?;
    let format = LogFormat::for_environment(settings.environment);

    let layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_filter(filter)
            .boxed(),
        LogFormat::Console => fmt::layer()
            .with_target(true)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {}", e))?;

    tracing::info!(
        log_level = %settings.log_level,
        environment = %settings.environment,
        format = ?format,
        "Structured logging initialized"
    );

    Ok(())
}

/// Install the Prometheus recorder and describe the service metrics
///
/// The returned handle renders the exposition text for the `/metrics` route.
pub fn init_metrics() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    describe_counter!(
        "db_sessions_acquired_total",
        Unit::Count,
        "Database sessions handed out by the pool"
    );
    describe_counter!(
        "db_session_acquire_failures_total",
        Unit::Count,
        "Session acquisitions that failed (pool exhausted or database unreachable)"
    );
    describe_counter!(
        "webhook_events_inserted_total",
        Unit::Count,
        "Webhook events persisted"
    );

    tracing::info!("Prometheus metrics recorder installed");
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_per_environment() {
        assert_eq!(LogFormat::for_environment(Environment::Dev), LogFormat::Json);
        assert_eq!(LogFormat::for_environment(Environment::Prod), LogFormat::Console);
    }

    #[test]
    fn test_env_filter_accepts_directives() {
        assert!(env_filter("info").is_ok());
        assert!(env_filter("common=debug,tower_http=info").is_ok());
    }
}
