//! Repository for the `notes` table.
//!
//! Status transitions are not exposed here: publish/archive go through
//! [`crate::workflow::NoteLifecycle`], review-driven mutations through
//! [`crate::workflow::ReviewWorkflow`].

use sqlx::PgPool;

use caselog_core::types::DbId;

use crate::models::note::{CreateNote, Note, UpdateNote};
use crate::{clamp_page, clamp_page_size};

/// Column list for `notes` queries.
pub(crate) const COLUMNS: &str = "\
    id, workspace_id, author_id, title, body, topic, tags, \
    recommend_for_journal, status, published_at, created_at, updated_at";

/// Provides authoring and read operations for case notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Insert a new draft note, returning the created row.
    pub async fn create(
        pool: &PgPool,
        workspace_id: DbId,
        author_id: DbId,
        input: &CreateNote,
    ) -> Result<Note, sqlx::Error> {
        let query = format!(
            "INSERT INTO notes
                (workspace_id, author_id, title, body, topic, tags, recommend_for_journal)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(workspace_id)
            .bind(author_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.topic)
            .bind(&input.tags)
            .bind(input.recommend_for_journal)
            .fetch_one(pool)
            .await
    }

    /// Find a note by ID within a workspace.
    pub async fn find_in_workspace(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM notes WHERE id = $1 AND workspace_id = $2"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a note's content fields. Returns the updated row, or `None`
    /// if the note does not exist in the workspace.
    pub async fn update_content(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
        input: &UpdateNote,
    ) -> Result<Option<Note>, sqlx::Error> {
        let query = format!(
            "UPDATE notes SET
                title = COALESCE($3, title),
                body = COALESCE($4, body),
                topic = COALESCE($5, topic),
                tags = COALESCE($6, tags),
                recommend_for_journal = COALESCE($7, recommend_for_journal)
             WHERE id = $1 AND workspace_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .bind(workspace_id)
            .bind(&input.title)
            .bind(&input.body)
            .bind(&input.topic)
            .bind(&input.tags)
            .bind(input.recommend_for_journal)
            .fetch_optional(pool)
            .await
    }

    /// List notes in a workspace, newest first, optionally filtered by
    /// status.
    pub async fn list_for_workspace(
        pool: &PgPool,
        workspace_id: DbId,
        status: Option<&str>,
        page: Option<i64>,
        page_size: Option<i64>,
    ) -> Result<Vec<Note>, sqlx::Error> {
        let page_size = clamp_page_size(page_size);
        let offset = (clamp_page(page) - 1) * page_size;

        let query = format!(
            "SELECT {COLUMNS} FROM notes
             WHERE workspace_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(workspace_id)
            .bind(status)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
