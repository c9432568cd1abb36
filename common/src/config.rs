// Configuration management with layered configuration (defaults, env file, env)

use crate::errors::SettingsError;
use config::{Config, Environment as EnvSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment file read next to the working directory for local setups
pub const DEFAULT_ENV_FILE: &str = ".env.local";

pub const DEFAULT_PROJECT_NAME: &str = "AI PR Reviewer";
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

/// Main settings structure, loaded once at startup and shared read-only.
///
/// Field names map one-to-one onto upper-case environment variables
/// (`postgres_user` is read from `POSTGRES_USER`). Unknown variables are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub project_name: String,
    #[serde(rename = "api_v1_str")]
    pub api_prefix: String,
    pub environment: Environment,

    pub postgres_user: String,
    pub postgres_password: String,
    pub postgres_db: String,
    pub postgres_host: String,
    pub postgres_port: u16,

    pub redis_host: String,
    pub redis_port: u16,
    pub redis_password: String,

    pub server_host: String,
    pub server_port: u16,
    pub log_level: String,

    pub db_pool_size: u32,
    pub db_max_overflow: u32,
    pub db_acquire_timeout_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl Settings {
    /// Load configuration with layered precedence: defaults → `.env.local` → process env
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from_path(DEFAULT_ENV_FILE)
    }

    /// Load configuration using a specific env file. A missing file is not an error.
    pub fn load_from_path<P: AsRef<Path>>(env_file: P) -> Result<Self, SettingsError> {
        let mut vars = read_env_file(env_file.as_ref())?;
        // Process environment always wins over the file
        vars.extend(process_env_vars());
        Self::load_from_vars(vars)
    }

    /// Load configuration from an explicit variable map instead of the process environment
    pub fn load_from_vars(vars: HashMap<String, String>) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .set_default("project_name", DEFAULT_PROJECT_NAME)?
            .set_default("api_v1_str", DEFAULT_API_PREFIX)?
            .set_default("environment", "dev")?
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8000_i64)?
            .set_default("log_level", "info")?
            .set_default("db_pool_size", 10_i64)?
            .set_default("db_max_overflow", 20_i64)?
            .set_default("db_acquire_timeout_seconds", 30_i64)?
            .set_default("request_timeout_seconds", 30_i64)?
            .add_source(EnvSource::default().source(Some(vars)).ignore_empty(true))
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/') {
            return Err(SettingsError::Invalid(format!(
                "API_V1_STR must start with '/' and must not end with '/', got '{}'",
                self.api_prefix
            )));
        }
        if self.postgres_port == 0 {
            return Err(SettingsError::Invalid(
                "POSTGRES_PORT must be greater than 0".to_string(),
            ));
        }
        if self.redis_port == 0 {
            return Err(SettingsError::Invalid(
                "REDIS_PORT must be greater than 0".to_string(),
            ));
        }
        if self.server_port == 0 {
            return Err(SettingsError::Invalid(
                "SERVER_PORT must be greater than 0".to_string(),
            ));
        }
        if self.db_pool_size == 0 {
            return Err(SettingsError::Invalid(
                "DB_POOL_SIZE must be greater than 0".to_string(),
            ));
        }
        if self.db_acquire_timeout_seconds == 0 {
            return Err(SettingsError::Invalid(
                "DB_ACQUIRE_TIMEOUT_SECONDS must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(SettingsError::Invalid(
                "REQUEST_TIMEOUT_SECONDS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Postgres connection URL assembled from the individual fields on every call
    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_host,
            self.postgres_port,
            self.postgres_db
        )
    }

    /// Redis connection URL assembled from the individual fields on every call
    pub fn redis_url(&self) -> String {
        format!(
            "redis://:{}@{}:{}",
            self.redis_password, self.redis_host, self.redis_port
        )
    }

    pub fn is_dev(&self) -> bool {
        self.environment == Environment::Dev
    }

    /// Upper bound of open connections: steady capacity plus overflow
    pub fn db_max_connections(&self) -> u32 {
        self.db_pool_size.saturating_add(self.db_max_overflow)
    }
}

/// Process environment as UTF-8 pairs. Variables whose name or value is not
/// valid UTF-8 cannot be settings and are skipped.
fn process_env_vars() -> HashMap<String, String> {
    std::env::vars_os()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                tracing::debug!(key = ?key, "Skipping non UTF-8 environment variable");
                None
            }
        })
        .collect()
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, SettingsError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(HashMap::new()),
        Err(e) => return Err(SettingsError::EnvFile(e)),
    };

    let mut vars = HashMap::new();
    for item in iter {
        let (key, value) = item?;
        vars.insert(key, value);
    }

    tracing::debug!(path = %path.display(), count = vars.len(), "Loaded env file");
    Ok(vars)
}
