//! Route definitions for case notes, merged under
//! `/workspaces/{workspace_id}/notes`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::note;
use crate::state::AppState;

/// ```text
/// GET  /                      list_notes
/// POST /                      create_note
/// GET  /{id}                  get_note
/// PUT  /{id}                  update_note
/// POST /{id}/submit-review    submit_for_review
/// POST /{id}/publish          publish_note
/// POST /{id}/archive          archive_note
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(note::list_notes).post(note::create_note))
        .route("/{id}", get(note::get_note).put(note::update_note))
        .route("/{id}/submit-review", post(note::submit_for_review))
        .route("/{id}/publish", post(note::publish_note))
        .route("/{id}/archive", post(note::archive_note))
}
