//! Handlers for case-note authoring and lifecycle actions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use caselog_core::error::CoreError;
use caselog_core::note::{validate_body, validate_tags, validate_title, validate_topic};
use caselog_core::roles;
use caselog_core::types::DbId;
use caselog_db::models::note::{CreateNote, NoteListParams, UpdateNote};
use caselog_db::models::review::CreateReviewRequest;
use caselog_db::repositories::NoteRepo;
use caselog_db::workflow::{NoteLifecycle, ReviewWorkflow};
use caselog_events::{event_types, PlatformEvent};

use crate::error::{AppError, AppResult};
use crate::membership::require_member;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /workspaces/{workspace_id}/notes
///
/// Create a new draft note authored by the caller.
pub async fn create_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workspace_id): Path<DbId>,
    Json(input): Json<CreateNote>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;
    if !roles::can_author_note(actor.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Viewers cannot author notes".into(),
        )));
    }

    validate_title(&input.title)?;
    validate_body(&input.body)?;
    validate_topic(&input.topic)?;
    validate_tags(&input.tags)?;

    let note = NoteRepo::create(&state.pool, workspace_id, actor.user_id, &input).await?;

    tracing::info!(
        user_id = actor.user_id,
        note_id = note.id,
        workspace_id,
        "Note created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// GET /workspaces/{workspace_id}/notes
///
/// List notes in the workspace, newest first.
pub async fn list_notes(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workspace_id): Path<DbId>,
    Query(params): Query<NoteListParams>,
) -> AppResult<impl IntoResponse> {
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    if let Some(status) = &params.status {
        status.parse::<caselog_core::note::NoteStatus>().map_err(|_| {
            AppError::BadRequest(format!("Unknown note status filter '{status}'"))
        })?;
    }

    let notes = NoteRepo::list_for_workspace(
        &state.pool,
        workspace_id,
        params.status.as_deref(),
        params.page,
        params.page_size,
    )
    .await?;

    Ok(Json(DataResponse { data: notes }))
}

/// GET /workspaces/{workspace_id}/notes/{id}
///
/// Get a single note.
pub async fn get_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    let note = NoteRepo::find_in_workspace(&state.pool, workspace_id, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Note",
            id,
        })?;

    Ok(Json(DataResponse { data: note }))
}

/// PUT /workspaces/{workspace_id}/notes/{id}
///
/// Update a note's content. Only the author (or an editor/admin) may edit,
/// and only while the note is in an editable status.
pub async fn update_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateNote>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    if let Some(title) = &input.title {
        validate_title(title)?;
    }
    if let Some(body) = &input.body {
        validate_body(body)?;
    }
    validate_topic(&input.topic)?;
    if let Some(tags) = &input.tags {
        validate_tags(tags)?;
    }

    let note = NoteRepo::find_in_workspace(&state.pool, workspace_id, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Note",
            id,
        })?;

    if note.author_id != actor.user_id && !roles::can_edit_any_note(actor.role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the note's author or an editor may edit it".into(),
        )));
    }

    if !note.status()?.is_editable() {
        return Err(AppError::Core(CoreError::InvalidTransition(format!(
            "Cannot edit a note in status '{}'",
            note.status
        ))));
    }

    let updated = NoteRepo::update_content(&state.pool, workspace_id, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Note",
            id,
        })?;

    tracing::info!(user_id = actor.user_id, note_id = id, workspace_id, "Note updated");

    Ok(Json(DataResponse { data: updated }))
}

/// POST /workspaces/{workspace_id}/notes/{id}/submit-review
///
/// Submit a draft note for review, creating a pending review request.
pub async fn submit_for_review(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateReviewRequest>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let request = ReviewWorkflow::create(&state.pool, workspace_id, id, actor, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::REVIEW_SUBMITTED, workspace_id)
            .with_source("review_request", request.id)
            .with_actor(actor.user_id)
            .with_payload(json!({ "note_id": id, "request_id": request.id })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// POST /workspaces/{workspace_id}/notes/{id}/publish
///
/// Publish an approved note.
pub async fn publish_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let note = NoteLifecycle::publish(&state.pool, workspace_id, id, actor).await?;

    let mut event = PlatformEvent::new(event_types::NOTE_PUBLISHED, workspace_id)
        .with_source("note", note.id)
        .with_actor(actor.user_id)
        .with_payload(json!({ "note_id": note.id, "title": note.title }));
    if note.author_id != actor.user_id {
        event = event.with_recipient(note.author_id);
    }
    state.event_bus.publish(event);

    Ok(Json(DataResponse { data: note }))
}

/// POST /workspaces/{workspace_id}/notes/{id}/archive
///
/// Archive a note. One-way.
pub async fn archive_note(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let note = NoteLifecycle::archive(&state.pool, workspace_id, id, actor).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::NOTE_ARCHIVED, workspace_id)
            .with_source("note", note.id)
            .with_actor(actor.user_id)
            .with_payload(json!({ "note_id": note.id })),
    );

    Ok(Json(DataResponse { data: note }))
}
