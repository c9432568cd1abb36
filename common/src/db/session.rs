// Scoped database session: one connection, one unit of work

use crate::errors::DatabaseError;
use sqlx::postgres::{PgConnection, Postgres};
use sqlx::Transaction;
use tracing::instrument;

/// A session bound to one pooled connection for one logical unit of work.
///
/// Work is wrapped in a transaction that is only made durable by an explicit
/// [`Session::commit`]. Dropping the session on any other path (early return,
/// `?`, panic) rolls the work back and hands the connection back to the pool.
/// Rows read through the session are owned values and remain usable after commit.
#[derive(Debug)]
pub struct Session {
    tx: Transaction<'static, Postgres>,
}

impl Session {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Connection to run queries on
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut *self.tx
    }

    /// Round-trip a trivial query on the session's connection
    #[instrument(skip(self))]
    pub async fn health_check(&mut self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(self.conn())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Database health check failed");
                DatabaseError::HealthCheckFailed(e.to_string())
            })?;

        tracing::debug!("Database health check passed");
        Ok(())
    }

    /// Make the unit of work durable and release the connection
    #[instrument(skip(self))]
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to commit session");
            DatabaseError::TransactionFailed(e.to_string())
        })
    }

    /// Discard the unit of work and release the connection
    #[instrument(skip(self))]
    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))
    }
}
