//! Handlers for journal generation and lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use serde_json::json;

use caselog_core::error::CoreError;
use caselog_core::types::DbId;
use caselog_db::models::journal::{
    GenerateJournal, Journal, JournalEntryDetail, JournalListParams,
};
use caselog_db::repositories::{JournalEntryRepo, JournalRepo};
use caselog_db::workflow::JournalAggregator;
use caselog_events::{event_types, PlatformEvent};

use crate::error::{AppError, AppResult};
use crate::membership::require_member;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A journal together with its snapshotted entries.
#[derive(Debug, Serialize)]
pub struct JournalDetail {
    #[serde(flatten)]
    pub journal: Journal,
    pub entries: Vec<JournalEntryDetail>,
}

/// POST /workspaces/{workspace_id}/journals/generate
///
/// Compile the period's published notes into a new draft journal.
pub async fn generate(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workspace_id): Path<DbId>,
    Json(input): Json<GenerateJournal>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let journal = JournalAggregator::generate(&state.pool, workspace_id, actor, &input).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::JOURNAL_GENERATED, workspace_id)
            .with_source("journal", journal.id)
            .with_actor(actor.user_id)
            .with_payload(json!({
                "journal_id": journal.id,
                "year": journal.year,
                "month": journal.month,
            })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: journal })))
}

/// GET /workspaces/{workspace_id}/journals
///
/// List journals ordered by period descending, filterable by status and
/// year.
pub async fn list_journals(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(workspace_id): Path<DbId>,
    Query(params): Query<JournalListParams>,
) -> AppResult<impl IntoResponse> {
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    if let Some(status) = &params.status {
        status
            .parse::<caselog_core::journal::JournalStatus>()
            .map_err(|_| {
                AppError::BadRequest(format!("Unknown journal status filter '{status}'"))
            })?;
    }

    let journals = JournalRepo::list_for_workspace(&state.pool, workspace_id, &params).await?;

    Ok(Json(DataResponse { data: journals }))
}

/// GET /workspaces/{workspace_id}/journals/{id}
///
/// Get a journal with its entries.
pub async fn get_journal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    require_member(&state.pool, workspace_id, auth.user_id).await?;

    let journal = JournalRepo::find_in_workspace(&state.pool, workspace_id, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Journal",
            id,
        })?;

    let entries = JournalEntryRepo::list_for_journal(&state.pool, journal.id).await?;

    Ok(Json(DataResponse {
        data: JournalDetail { journal, entries },
    }))
}

/// POST /workspaces/{workspace_id}/journals/{id}/publish
///
/// Publish a draft journal.
pub async fn publish_journal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let journal = JournalAggregator::publish(&state.pool, workspace_id, id, actor).await?;

    state.event_bus.publish(
        PlatformEvent::new(event_types::JOURNAL_PUBLISHED, workspace_id)
            .with_source("journal", journal.id)
            .with_actor(actor.user_id)
            .with_payload(json!({ "journal_id": journal.id, "title": journal.title })),
    );

    Ok(Json(DataResponse { data: journal }))
}

/// POST /workspaces/{workspace_id}/journals/{id}/archive
///
/// Archive a journal, freeing its period for regeneration.
pub async fn archive_journal(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let actor = require_member(&state.pool, workspace_id, auth.user_id).await?;

    let journal = JournalAggregator::archive(&state.pool, workspace_id, id, actor).await?;

    Ok(Json(DataResponse { data: journal }))
}
