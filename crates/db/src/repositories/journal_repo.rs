//! Repositories for the `journals` and `journal_entries` tables.
//!
//! Generation, publication, and archival go through
//! [`crate::workflow::JournalAggregator`]; this module is the read-only
//! projection side (plus the column lists the aggregator shares).

use sqlx::PgPool;

use caselog_core::types::DbId;

use crate::models::journal::{Journal, JournalEntryDetail, JournalListParams};
use crate::{clamp_page, clamp_page_size};

/// Column list for `journals` queries.
pub(crate) const JOURNAL_COLUMNS: &str = "\
    id, workspace_id, year, month, title, editorial_note, status, \
    published_at, created_at, updated_at";

/// Provides read operations for journals.
pub struct JournalRepo;

impl JournalRepo {
    /// Find a journal by ID within a workspace.
    pub async fn find_in_workspace(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
    ) -> Result<Option<Journal>, sqlx::Error> {
        let query = format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals
             WHERE id = $1 AND workspace_id = $2"
        );
        sqlx::query_as::<_, Journal>(&query)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await
    }

    /// List journals in a workspace ordered by period descending, with
    /// optional status and year filters.
    pub async fn list_for_workspace(
        pool: &PgPool,
        workspace_id: DbId,
        params: &JournalListParams,
    ) -> Result<Vec<Journal>, sqlx::Error> {
        let page_size = clamp_page_size(params.page_size);
        let offset = (clamp_page(params.page) - 1) * page_size;

        let query = format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals
             WHERE workspace_id = $1
               AND ($2::TEXT IS NULL OR status = $2)
               AND ($3::INT IS NULL OR year = $3)
             ORDER BY year DESC, month DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Journal>(&query)
            .bind(workspace_id)
            .bind(&params.status)
            .bind(params.year)
            .bind(page_size)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}

/// Provides read operations for journal entries.
pub struct JournalEntryRepo;

impl JournalEntryRepo {
    /// List a journal's entries in position order, joined with the headline
    /// fields of each selected note.
    pub async fn list_for_journal(
        pool: &PgPool,
        journal_id: DbId,
    ) -> Result<Vec<JournalEntryDetail>, sqlx::Error> {
        sqlx::query_as::<_, JournalEntryDetail>(
            "SELECT
                e.id,
                e.note_id,
                e.position,
                n.title,
                n.author_id,
                n.topic,
                n.published_at
             FROM journal_entries e
             JOIN notes n ON n.id = e.note_id
             WHERE e.journal_id = $1
             ORDER BY e.position ASC",
        )
        .bind(journal_id)
        .fetch_all(pool)
        .await
    }
}
