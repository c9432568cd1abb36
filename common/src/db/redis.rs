// Redis client, used for readiness probing

use crate::config::Settings;
use crate::errors::CacheError;
use redis::Client;
use tracing::{info, instrument};

/// Redis client wrapper. Creating it validates the URL only; connections are
/// opened on demand.
#[derive(Debug, Clone)]
pub struct RedisPool {
    client: Client,
}

impl RedisPool {
    /// Create a Redis client from the `REDIS_*` settings
    #[instrument(skip(settings), fields(host = %settings.redis_host, port = settings.redis_port))]
    pub fn new(settings: &Settings) -> Result<Self, CacheError> {
        let client = Client::open(settings.redis_url()).map_err(|e| {
            CacheError::ConnectionFailed(format!("Failed to create Redis client: {}", e))
        })?;

        info!("Redis client initialized");
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Health check - verify Redis answers PING
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let response: String = redis::cmd("PING").query_async(&mut conn).await?;

        if response != "PONG" {
            return Err(CacheError::CommandFailed(format!(
                "Unexpected PING response: {}",
                response
            )));
        }

        tracing::debug!("Redis health check passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings() -> Settings {
        let vars: HashMap<String, String> = [
            ("POSTGRES_USER", "u"),
            ("POSTGRES_PASSWORD", "p"),
            ("POSTGRES_DB", "d"),
            ("POSTGRES_HOST", "localhost"),
            ("POSTGRES_PORT", "5432"),
            ("REDIS_HOST", "localhost"),
            ("REDIS_PORT", "6379"),
            ("REDIS_PASSWORD", "secret"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Settings::load_from_vars(vars).unwrap()
    }

    #[test]
    fn test_client_creation_does_not_connect() {
        let pool = RedisPool::new(&settings()).unwrap();
        let info = pool.client().get_connection_info();
        assert_eq!(info.redis.password.as_deref(), Some("secret"));
    }

    #[tokio::test]
    #[ignore] // Requires Redis to be running
    async fn test_redis_health_check() {
        let pool = RedisPool::new(&settings()).unwrap();
        assert!(pool.health_check().await.is_ok());
    }
}
