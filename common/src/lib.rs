// Shared library for the webhook event service: settings, database sessions, schema

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod telemetry;
