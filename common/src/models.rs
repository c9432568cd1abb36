use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ============================================================================
// Shared field groups
// ============================================================================

/// Surrogate key, generated client-side before insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, FromRow)]
pub struct RecordKey {
    pub id: Uuid,
}

impl RecordKey {
    pub fn generate() -> Self {
        Self { id: Uuid::new_v4() }
    }
}

/// Row timestamps. Both are set by the database: `created_at` on insert,
/// `updated_at` on insert and on every update (trigger).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Webhook Event Models
// ============================================================================

/// WebhookEvent is one delivery received from an external provider,
/// persisted for audit and later processing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WebhookEvent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub key: RecordKey,
    pub provider: String,
    /// Provider's idempotency token; unique across all events
    pub delivery_id: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub signature_valid: bool,
    pub received_at: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl WebhookEvent {
    pub const TABLE: &'static str = "webhook_events";

    pub fn id(&self) -> Uuid {
        self.key.id
    }
}

/// Insert payload for a webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWebhookEvent {
    #[serde(skip, default = "RecordKey::generate")]
    pub key: RecordKey,
    pub provider: String,
    pub delivery_id: String,
    pub event_type: String,
    pub payload: serde_json::Value,
    #[serde(default)]
    pub signature_valid: bool,
    /// Defaults to the insertion time when absent
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

impl NewWebhookEvent {
    pub fn new(
        provider: impl Into<String>,
        delivery_id: impl Into<String>,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            key: RecordKey::generate(),
            provider: provider.into(),
            delivery_id: delivery_id.into(),
            event_type: event_type.into(),
            payload,
            signature_valid: false,
            received_at: None,
        }
    }

    pub fn with_signature_valid(mut self, signature_valid: bool) -> Self {
        self.signature_valid = signature_valid;
        self
    }

    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = Some(received_at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_keys_are_unique() {
        let a = RecordKey::generate();
        let b = RecordKey::generate();
        assert_ne!(a, b);
        assert_eq!(a.id.get_version_num(), 4);
    }

    #[test]
    fn test_new_webhook_event_defaults() {
        let event = NewWebhookEvent::new("github", "abc-123", "push", json!({"ref": "main"}));
        assert!(!event.signature_valid);
        assert!(event.received_at.is_none());
        assert_eq!(event.provider, "github");
    }

    #[test]
    fn test_new_webhook_event_builder() {
        let at = Utc::now();
        let event = NewWebhookEvent::new("github", "abc-123", "push", json!({}))
            .with_signature_valid(true)
            .with_received_at(at);
        assert!(event.signature_valid);
        assert_eq!(event.received_at, Some(at));
    }

    #[test]
    fn test_new_webhook_event_deserialize_defaults() {
        let event: NewWebhookEvent = serde_json::from_value(json!({
            "provider": "gitlab",
            "delivery_id": "d-1",
            "event_type": "merge_request",
            "payload": {"action": "open"}
        }))
        .unwrap();
        assert!(!event.signature_valid);
        assert!(event.received_at.is_none());
        assert_eq!(event.key.id.get_version_num(), 4);
    }

    #[test]
    fn test_webhook_event_serializes_flat() {
        let now = Utc::now();
        let event = WebhookEvent {
            key: RecordKey::generate(),
            provider: "github".to_string(),
            delivery_id: "abc-123".to_string(),
            event_type: "push".to_string(),
            payload: json!({"ref": "main"}),
            signature_valid: true,
            received_at: now,
            timestamps: Timestamps {
                created_at: now,
                updated_at: now,
            },
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["id"], json!(event.id().to_string()));
        assert_eq!(value["delivery_id"], "abc-123");
        assert!(value.get("created_at").is_some());
        assert!(value.get("key").is_none());
        assert!(value.get("timestamps").is_none());
    }
}
