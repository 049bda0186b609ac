pub mod health;
pub mod journals;
pub mod notes;
pub mod reviews;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /workspaces/{workspace_id}/notes                     list, create
/// /workspaces/{workspace_id}/notes/{id}                get, update
/// /workspaces/{workspace_id}/notes/{id}/submit-review  open a review request
/// /workspaces/{workspace_id}/notes/{id}/publish        publish (editor/admin)
/// /workspaces/{workspace_id}/notes/{id}/archive        archive (one-way)
///
/// /workspaces/{workspace_id}/reviews                   list
/// /workspaces/{workspace_id}/reviews/{id}              get
/// /workspaces/{workspace_id}/reviews/{id}/actions      audit ledger (ascending)
/// /workspaces/{workspace_id}/reviews/{id}/assign       assign reviewer
/// /workspaces/{workspace_id}/reviews/{id}/verdict      approve / reject / request changes
/// /workspaces/{workspace_id}/reviews/{id}/comments     add comment
/// /workspaces/{workspace_id}/reviews/{id}/revision     record revised content
/// /workspaces/{workspace_id}/reviews/{id}/reopen       reopen a rejected cycle
///
/// /workspaces/{workspace_id}/journals                  list (period desc)
/// /workspaces/{workspace_id}/journals/generate         compile a period
/// /workspaces/{workspace_id}/journals/{id}             get with entries
/// /workspaces/{workspace_id}/journals/{id}/publish     publish draft
/// /workspaces/{workspace_id}/journals/{id}/archive     archive (one-way)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/workspaces/{workspace_id}/notes", notes::router())
        .nest("/workspaces/{workspace_id}/reviews", reviews::router())
        .nest("/workspaces/{workspace_id}/journals", journals::router())
}
