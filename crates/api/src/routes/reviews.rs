//! Route definitions for review requests, merged under
//! `/workspaces/{workspace_id}/reviews`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::review;
use crate::state::AppState;

/// ```text
/// GET  /                 list_requests
/// GET  /{id}             get_request
/// GET  /{id}/actions     list_actions
/// POST /{id}/assign      assign_reviewer
/// POST /{id}/verdict     submit_verdict
/// POST /{id}/comments    add_comment
/// POST /{id}/revision    submit_revision
/// POST /{id}/reopen      reopen
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(review::list_requests))
        .route("/{id}", get(review::get_request))
        .route("/{id}/actions", get(review::list_actions))
        .route("/{id}/assign", post(review::assign_reviewer))
        .route("/{id}/verdict", post(review::submit_verdict))
        .route("/{id}/comments", post(review::add_comment))
        .route("/{id}/revision", post(review::submit_revision))
        .route("/{id}/reopen", post(review::reopen))
}
