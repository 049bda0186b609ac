//! Repositories for the `review_requests` and `review_actions` tables.
//!
//! `ReviewActionRepo` is the append-only audit ledger: it exposes `append`
//! and ordered reads, and nothing else. Request status transitions live in
//! [`crate::workflow::ReviewWorkflow`], which appends to the ledger inside
//! the same transaction as every status write.

use sqlx::{PgExecutor, PgPool};

use caselog_core::types::DbId;

use crate::models::review::{NewReviewAction, ReviewAction, ReviewRequest};
use crate::{clamp_page, clamp_page_size};

/// Column list for `review_requests` queries.
pub(crate) const REQUEST_COLUMNS: &str = "\
    id, note_id, workspace_id, requester_id, reviewer_id, priority, \
    due_date, status, created_at, updated_at";

/// Column list for `review_actions` queries.
pub(crate) const ACTION_COLUMNS: &str = "\
    id, request_id, workspace_id, actor_id, action, note, metadata, created_at";

/// Provides read operations for review requests.
pub struct ReviewRequestRepo;

impl ReviewRequestRepo {
    /// Find a request by ID within a workspace.
    pub async fn find_in_workspace(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
    ) -> Result<Option<ReviewRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM review_requests
             WHERE id = $1 AND workspace_id = $2"
        );
        sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await
    }

    /// Find the open (pending or in-review) request for a note, if any.
    pub async fn find_open_for_note(
        pool: &PgPool,
        note_id: DbId,
    ) -> Result<Option<ReviewRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM review_requests
             WHERE note_id = $1 AND status IN ('pending', 'in_review')"
        );
        sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(note_id)
            .fetch_optional(pool)
            .await
    }

    /// List requests in a workspace, newest first, optionally filtered by
    /// status.
    pub async fn list_for_workspace(
        pool: &PgPool,
        workspace_id: DbId,
        status: Option<&str>,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Vec<ReviewRequest>, sqlx::Error> {
        let page_size = clamp_page_size(page_size);
        let offset = (clamp_page(page) - 1) * page_size;

        let query = format!(
            "SELECT {REQUEST_COLUMNS} FROM review_requests
             WHERE workspace_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(workspace_id)
            .bind(status)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}

/// Append-only writer/reader for the review-action ledger.
pub struct ReviewActionRepo;

impl ReviewActionRepo {
    /// Append one ledger entry.
    ///
    /// Takes any executor so the workflow engines can append inside their
    /// transactions. Fails only on constraint violations (unknown request,
    /// unknown actor).
    pub async fn append<'e, E>(
        executor: E,
        entry: &NewReviewAction,
    ) -> Result<ReviewAction, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "INSERT INTO review_actions
                (request_id, workspace_id, actor_id, action, note, metadata)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ACTION_COLUMNS}"
        );
        sqlx::query_as::<_, ReviewAction>(&query)
            .bind(entry.request_id)
            .bind(entry.workspace_id)
            .bind(entry.actor_id)
            .bind(entry.kind.as_str())
            .bind(&entry.note)
            .bind(&entry.metadata)
            .fetch_one(executor)
            .await
    }

    /// List all entries for a request in creation order (ascending).
    ///
    /// This ordering is the canonical reconstruction of the request's
    /// status; `caselog_core::review::replay` over the returned kinds must
    /// equal the stored `review_requests.status`.
    pub async fn list_for_request(
        pool: &PgPool,
        request_id: DbId,
    ) -> Result<Vec<ReviewAction>, sqlx::Error> {
        let query = format!(
            "SELECT {ACTION_COLUMNS} FROM review_actions
             WHERE request_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ReviewAction>(&query)
            .bind(request_id)
            .fetch_all(pool)
            .await
    }
}
