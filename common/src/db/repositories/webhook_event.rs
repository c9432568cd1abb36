use crate::db::Session;
use crate::errors::DatabaseError;
use crate::models::{NewWebhookEvent, WebhookEvent};
use uuid::Uuid;

const SELECT_COLUMNS: &str = "id, provider, delivery_id, event_type, payload, signature_valid, \
                              received_at, created_at, updated_at";

/// WebhookEventRepository handles database operations for received webhook events.
///
/// Every operation runs on the caller's session; nothing here commits.
pub struct WebhookEventRepository;

impl WebhookEventRepository {
    /// Insert a new webhook event
    ///
    /// `received_at` falls back to the database clock when not provided.
    ///
    /// # Errors
    /// `DatabaseError::DuplicateKey` if an event with the same `delivery_id` exists.
    /// The session's transaction is aborted in that case and should be dropped.
    #[tracing::instrument(skip(session, event), fields(
        provider = %event.provider,
        delivery_id = %event.delivery_id,
    ))]
    pub async fn insert(
        session: &mut Session,
        event: &NewWebhookEvent,
    ) -> Result<WebhookEvent, DatabaseError> {
        let query = format!(
            r#"
            INSERT INTO {} (id, provider, delivery_id, event_type, payload, signature_valid, received_at)
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, NOW()))
            RETURNING {}
            "#,
            WebhookEvent::TABLE,
            SELECT_COLUMNS
        );

        let inserted = sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(event.key.id)
            .bind(&event.provider)
            .bind(&event.delivery_id)
            .bind(&event.event_type)
            .bind(&event.payload)
            .bind(event.signature_valid)
            .bind(event.received_at)
            .fetch_one(session.conn())
            .await
            .map_err(|e| {
                let err = DatabaseError::from(e);
                if err.is_duplicate_key() {
                    tracing::warn!("Duplicate webhook delivery rejected");
                }
                err
            })?;

        metrics::counter!("webhook_events_inserted_total").increment(1);
        tracing::info!(
            event_id = %inserted.id(),
            event_type = %inserted.event_type,
            "Stored webhook event"
        );

        Ok(inserted)
    }

    /// Find an event by the provider's delivery id
    #[tracing::instrument(skip(session))]
    pub async fn find_by_delivery_id(
        session: &mut Session,
        delivery_id: &str,
    ) -> Result<Option<WebhookEvent>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM {} WHERE delivery_id = $1",
            SELECT_COLUMNS,
            WebhookEvent::TABLE
        );

        let event = sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(delivery_id)
            .fetch_optional(session.conn())
            .await?;

        Ok(event)
    }

    /// Find an event by its surrogate key
    #[tracing::instrument(skip(session))]
    pub async fn find_by_id(
        session: &mut Session,
        id: Uuid,
    ) -> Result<Option<WebhookEvent>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM {} WHERE id = $1",
            SELECT_COLUMNS,
            WebhookEvent::TABLE
        );

        let event = sqlx::query_as::<_, WebhookEvent>(&query)
            .bind(id)
            .fetch_optional(session.conn())
            .await?;

        Ok(event)
    }
}
