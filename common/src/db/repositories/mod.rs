// Repository layer for database operations

pub mod webhook_event;

pub use webhook_event::WebhookEventRepository;
