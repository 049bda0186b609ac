//! Route definitions for journals, merged under
//! `/workspaces/{workspace_id}/journals`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::journal;
use crate::state::AppState;

/// ```text
/// GET  /                 list_journals
/// POST /generate         generate
/// GET  /{id}             get_journal (with entries)
/// POST /{id}/publish     publish_journal
/// POST /{id}/archive     archive_journal
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(journal::list_journals))
        .route("/generate", post(journal::generate))
        .route("/{id}", get(journal::get_journal))
        .route("/{id}/publish", post(journal::publish_journal))
        .route("/{id}/archive", post(journal::archive_journal))
}
