use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::ErrorResponse;
use crate::extract::DbSession;
use crate::state::AppState;

/// Liveness endpoint: answers whenever the process is up
#[tracing::instrument]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

/// Readiness endpoint: checks that a database session can be acquired and
/// used, and that Redis answers
#[tracing::instrument(skip(state, session))]
pub async fn readiness_check(
    State(state): State<AppState>,
    DbSession(mut session): DbSession,
) -> Result<impl IntoResponse, ErrorResponse> {
    session.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness database check failed");
        ErrorResponse::from(e).with_details(json!({ "component": "database" }))
    })?;
    session.rollback().await?;

    state.redis.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness cache check failed");
        ErrorResponse::from(e).with_details(json!({ "component": "cache" }))
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({ "status": "ready", "database": "ok", "cache": "ok" })),
    ))
}
