//! Dashboard stats endpoint

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::models::DashboardStats;

/// GET /api/dashboard/stats - recomputed on every call
async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<DashboardStats>, ApiError> {
    let stats = state.store.dashboard_stats().await?;
    Ok(Json(stats))
}

/// Dashboard routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/dashboard/stats", get(stats))
}
