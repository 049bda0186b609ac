//! Health check route.

use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Build the root-level health router.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// GET /health
///
/// Liveness probe; does not touch the database.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
