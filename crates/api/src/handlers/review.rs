//! Handlers for the review-request workflow.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use caselog_core::error::CoreError;
use caselog_core::types::DbId;
use caselog_db::models::review::{AddComment, AssignReviewer, ReviewListParams, SubmitVerdict};
use caselog_db::repositories::{ReviewActionRepo, ReviewRequestRepo};
use caselog_db::workflow::ReviewWorkflow;
use caselog_events::{event_types, PlatformEvent};

use crate::error::{AppError, AppResult};
use crate::membership::require_member;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /workspaces/{workspace_id}/reviews
///
/// List review requests in the workspace, newest first.
pub async fn list_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workspace_id): Path<DbId>,
    Query(params): Query<ReviewListParams>,
) -> AppResult<impl IntoResponse> {
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    if let Some(status) = &params.status {
        status
            .parse::<caselog_core::review::ReviewStatus>()
            .map_err(|_| AppError::BadRequest(format!("Unknown review status filter '{status}'")))?;
    }

    let requests = ReviewRequestRepo::list_for_workspace(
        &state.pool,
        workspace_id,
        params.status.as_deref(),
        params.page,
        params.page_size,
    )
    .await?;

    Ok(Json(DataResponse { data: requests }))
}

/// GET /workspaces/{workspace_id}/reviews/{id}
///
/// Get a single review request.
pub async fn get_request(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    let request = ReviewRequestRepo::find_in_workspace(&state.pool, workspace_id, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ReviewRequest",
            id,
        })?;

    Ok(Json(DataResponse { data: request }))
}

/// GET /workspaces/{workspace_id}/reviews/{id}/actions
///
/// List the request's audit ledger in creation order.
pub async fn list_actions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    // Confirm the request exists in this workspace before reading its
    // ledger, so cross-workspace ids report NotFound.
    ReviewRequestRepo::find_in_workspace(&state.pool, workspace_id, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ReviewRequest",
            id,
        })?;

    let actions = ReviewActionRepo::list_for_request(&state.pool, id).await?;

    Ok(Json(DataResponse { data: actions }))
}

/// POST /workspaces/{workspace_id}/reviews/{id}/assign
///
/// Assign (or reassign) a reviewer.
pub async fn assign_reviewer(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<AssignReviewer>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let request =
        ReviewWorkflow::assign_reviewer(&state.pool, workspace_id, id, actor, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::REVIEW_ASSIGNED, workspace_id)
            .with_source("review_request", request.id)
            .with_actor(actor.user_id)
            .with_recipient(input.reviewer_id)
            .with_payload(json!({
                "request_id": request.id,
                "note_id": request.note_id,
                "priority": request.priority,
            })),
    );

    Ok(Json(DataResponse { data: request }))
}

/// POST /workspaces/{workspace_id}/reviews/{id}/verdict
///
/// Record the assigned reviewer's verdict.
pub async fn submit_verdict(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<SubmitVerdict>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let request =
        ReviewWorkflow::submit_verdict(&state.pool, workspace_id, id, actor, &input).await?;

    let mut event = PlatformEvent::new(event_types::REVIEW_VERDICT, workspace_id)
        .with_source("review_request", request.id)
        .with_actor(actor.user_id)
        .with_payload(json!({
            "request_id": request.id,
            "note_id": request.note_id,
            "verdict": request.status,
        }));
    if request.requester_id != actor.user_id {
        event = event.with_recipient(request.requester_id);
    }
    state.event_bus.publish(event);

    Ok(Json(DataResponse { data: request }))
}

/// POST /workspaces/{workspace_id}/reviews/{id}/comments
///
/// Add a free-text comment to the request's ledger.
pub async fn add_comment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<AddComment>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let action =
        ReviewWorkflow::add_comment(&state.pool, workspace_id, id, actor, &input.text).await?;

    // The requester follows the conversation; don't echo their own comment
    // back at them.
    let request = ReviewRequestRepo::find_in_workspace(&state.pool, workspace_id, id).await?;
    if let Some(request) = request {
        if request.requester_id != actor.user_id {
            state.event_bus.publish(
                PlatformEvent::new(event_types::REVIEW_COMMENTED, workspace_id)
                    .with_source("review_request", id)
                    .with_actor(actor.user_id)
                    .with_recipient(request.requester_id)
                    .with_payload(json!({ "request_id": id, "action_id": action.id })),
            );
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: action })))
}

/// POST /workspaces/{workspace_id}/reviews/{id}/revision
///
/// Record that the author submitted revised note content.
pub async fn submit_revision(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let action = ReviewWorkflow::submit_revision(&state.pool, workspace_id, id, actor).await?;

    let request = ReviewRequestRepo::find_in_workspace(&state.pool, workspace_id, id).await?;
    if let Some(request) = request {
        if let Some(reviewer_id) = request.reviewer_id {
            state.event_bus.publish(
                PlatformEvent::new(event_types::REVIEW_REVISION, workspace_id)
                    .with_source("review_request", id)
                    .with_actor(actor.user_id)
                    .with_recipient(reviewer_id)
                    .with_payload(json!({ "request_id": id, "note_id": request.note_id })),
            );
        }
    }

    Ok((StatusCode::CREATED, Json(DataResponse { data: action })))
}

/// POST /workspaces/{workspace_id}/reviews/{id}/reopen
///
/// Reopen a rejected / changes-requested request back to pending.
pub async fn reopen(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let request = ReviewWorkflow::reopen(&state.pool, workspace_id, id, actor).await?;

    let mut event = PlatformEvent::new(event_types::REVIEW_REOPENED, workspace_id)
        .with_source("review_request", request.id)
        .with_actor(actor.user_id)
        .with_payload(json!({ "request_id": request.id, "note_id": request.note_id }));
    if request.requester_id != actor.user_id {
        event = event.with_recipient(request.requester_id);
    }
    state.event_bus.publish(event);

    Ok(Json(DataResponse { data: request }))
}
