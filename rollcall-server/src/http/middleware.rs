//! Connection-ensure middleware for database-backed routes

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::error::ApiError;
use super::server::AppState;

/// Open (or join the opening of) the database connection before the handler runs.
pub async fn require_database(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.store.ensure_ready().await?;
    Ok(next.run(req).await)
}
