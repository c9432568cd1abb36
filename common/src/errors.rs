// Error handling framework

use thiserror::Error;

/// Configuration errors. Fatal at startup.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Database-specific errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Timed out waiting for a pooled connection")]
    PoolExhausted,

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate key violation: {0}")]
    DuplicateKey(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl DatabaseError {
    /// True for unique constraint violations, e.g. a redelivered webhook
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, DatabaseError::DuplicateKey(_))
    }
}

/// Cache (Redis) errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Cache command failed: {0}")]
    CommandFailed(String),
}

// Implement From for common external errors
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::PoolClosed => {
                DatabaseError::ConnectionFailed("Connection pool is closed".to_string())
            }
            sqlx::Error::Io(e) => DatabaseError::ConnectionFailed(e.to_string()),
            sqlx::Error::Database(db_err) => {
                // SQLSTATE 23505 is unique_violation
                match db_err.code().as_deref() {
                    Some("23505") => DatabaseError::DuplicateKey(db_err.message().to_string()),
                    _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationFailed(err.to_string())
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() || err.is_timeout() {
            CacheError::ConnectionFailed(err.to_string())
        } else {
            CacheError::CommandFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::DuplicateKey("delivery_id".to_string());
        assert_eq!(err.to_string(), "Duplicate key violation: delivery_id");
        assert!(err.is_duplicate_key());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DatabaseError::NotFound(_)));
    }

    #[test]
    fn test_pool_timeout_maps_to_exhausted() {
        let err: DatabaseError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DatabaseError::PoolExhausted));
        assert!(!err.is_duplicate_key());
    }

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::Invalid("DB_POOL_SIZE must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: DB_POOL_SIZE must be greater than 0"
        );
    }
}
