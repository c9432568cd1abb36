use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use common::db::Session;

use crate::handlers::ErrorResponse;
use crate::state::AppState;

/// Scoped database session for the duration of one request.
///
/// The handler decides whether to commit; if it returns without committing the
/// session is rolled back when dropped and its connection goes back to the pool.
pub struct DbSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for DbSession {
    type Rejection = ErrorResponse;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.db_pool.session().await?;
        Ok(DbSession(session))
    }
}
