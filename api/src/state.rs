use std::sync::Arc;

use common::config::Settings;
use common::db::{DbPool, RedisPool};
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub redis: RedisPool,
    pub metrics: PrometheusHandle,
    pub config: Arc<Settings>,
}

impl AppState {
    /// Create a new AppState instance
    pub fn new(
        db_pool: DbPool,
        redis: RedisPool,
        metrics: PrometheusHandle,
        config: Arc<Settings>,
    ) -> Self {
        Self {
            db_pool,
            redis,
            metrics,
            config,
        }
    }
}
