use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub name: String,
    pub version: &'static str,
    pub environment: String,
    pub api: String,
}

/// Service information at the root URL
#[tracing::instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: state.config.project_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.to_string(),
        api: format!("{}/v1", state.config.api_prefix),
    })
}
