//! The journal aggregation engine.
//!
//! Compiles a workspace's published notes for a calendar month into a
//! journal. Generation is two-phase inside one transaction: the journal is
//! inserted in `generating`, the entry snapshot is written, and only then
//! does the status flip to `draft` — so no reader ever observes a draft
//! journal with partial content, and an aborted run leaves nothing behind.

use sqlx::PgPool;

use caselog_core::error::CoreError;
use caselog_core::journal::{self, JournalStatus};
use caselog_core::roles;
use caselog_core::types::DbId;

use crate::models::journal::{GenerateJournal, Journal};
use crate::repositories::journal_repo::JOURNAL_COLUMNS;
use crate::workflow::Actor;
use crate::DbResult;

/// Periodic compilation of published notes into journals.
pub struct JournalAggregator;

impl JournalAggregator {
    /// Generate the journal for a (workspace, year, month) period.
    ///
    /// Selects every `published` note whose publish timestamp falls inside
    /// the period (optionally only those flagged for the journal) and
    /// snapshots them as entries in publication order. Fails with
    /// `Conflict` if a non-archived journal already exists for the period;
    /// two racing runs serialize on the workspace row lock.
    pub async fn generate(
        pool: &PgPool,
        workspace_id: DbId,
        actor: Actor,
        input: &GenerateJournal,
    ) -> DbResult<Journal> {
        if !roles::can_manage_journal(actor.role) {
            return Err(CoreError::Forbidden(
                "Only editors and admins may generate journals".to_string(),
            )
            .into());
        }

        journal::validate_period(input.year, input.month)?;
        if let Some(title) = &input.title {
            journal::validate_title(title)?;
        }
        journal::validate_editorial_note(&input.editorial_note)?;

        let (start, end) = journal::period_bounds(input.year, input.month)?;
        let title = input
            .title
            .clone()
            .unwrap_or_else(|| journal::default_title(input.year, input.month));

        let mut tx = pool.begin().await?;

        // The workspace row serializes concurrent generation runs for the
        // same period.
        let workspace_exists =
            sqlx::query_scalar::<_, bool>("SELECT TRUE FROM workspaces WHERE id = $1 FOR UPDATE")
                .bind(workspace_id)
                .fetch_optional(&mut *tx)
                .await?
                .unwrap_or(false);

        if !workspace_exists {
            return Err(CoreError::NotFound {
                entity: "Workspace",
                id: workspace_id,
            }
            .into());
        }

        let period_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM journals
                WHERE workspace_id = $1 AND year = $2 AND month = $3
                  AND status <> 'archived'
             )",
        )
        .bind(workspace_id)
        .bind(input.year)
        .bind(input.month as i32)
        .fetch_one(&mut *tx)
        .await?;

        if period_taken {
            return Err(CoreError::Conflict(format!(
                "A journal for {}-{:02} already exists in this workspace",
                input.year, input.month
            ))
            .into());
        }

        let query = format!(
            "INSERT INTO journals
                (workspace_id, year, month, title, editorial_note, status)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {JOURNAL_COLUMNS}"
        );
        let generating = sqlx::query_as::<_, Journal>(&query)
            .bind(workspace_id)
            .bind(input.year)
            .bind(input.month as i32)
            .bind(&title)
            .bind(&input.editorial_note)
            .bind(JournalStatus::Generating.as_str())
            .fetch_one(&mut *tx)
            .await?;

        // Snapshot the period's published notes as entries, in publication
        // order.
        let entry_count = sqlx::query_scalar::<_, i64>(
            "WITH selected AS (
                SELECT id,
                       ROW_NUMBER() OVER (ORDER BY published_at ASC, id ASC) AS position
                FROM notes
                WHERE workspace_id = $2
                  AND status = 'published'
                  AND published_at >= $3
                  AND published_at < $4
                  AND (NOT $5 OR recommend_for_journal)
             ),
             inserted AS (
                INSERT INTO journal_entries (journal_id, note_id, position)
                SELECT $1, id, position FROM selected
                RETURNING 1
             )
             SELECT COUNT(*)::BIGINT FROM inserted",
        )
        .bind(generating.id)
        .bind(workspace_id)
        .bind(start)
        .bind(end)
        .bind(input.only_recommended)
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE journals SET status = $2 WHERE id = $1 RETURNING {JOURNAL_COLUMNS}"
        );
        let draft = sqlx::query_as::<_, Journal>(&query)
            .bind(generating.id)
            .bind(JournalStatus::Draft.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            journal_id = draft.id,
            workspace_id,
            year = input.year,
            month = input.month,
            entries = entry_count,
            actor_id = actor.user_id,
            "Journal generated"
        );

        Ok(draft)
    }

    /// Publish a draft journal, stamping `published_at`.
    pub async fn publish(
        pool: &PgPool,
        workspace_id: DbId,
        journal_id: DbId,
        actor: Actor,
    ) -> DbResult<Journal> {
        if !roles::can_manage_journal(actor.role) {
            return Err(CoreError::Forbidden(
                "Only editors and admins may publish journals".to_string(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let current = Self::lock_journal(&mut tx, workspace_id, journal_id).await?;
        journal::check_publish(current.status()?)?;

        let query = format!(
            "UPDATE journals SET status = $2, published_at = NOW()
             WHERE id = $1
             RETURNING {JOURNAL_COLUMNS}"
        );
        let published = sqlx::query_as::<_, Journal>(&query)
            .bind(journal_id)
            .bind(JournalStatus::Published.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            journal_id,
            workspace_id,
            actor_id = actor.user_id,
            "Journal published"
        );

        Ok(published)
    }

    /// Archive a journal. One-way, legal from any status except
    /// `archived`; archiving frees the period for regeneration.
    pub async fn archive(
        pool: &PgPool,
        workspace_id: DbId,
        journal_id: DbId,
        actor: Actor,
    ) -> DbResult<Journal> {
        if !roles::can_manage_journal(actor.role) {
            return Err(CoreError::Forbidden(
                "Only editors and admins may archive journals".to_string(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let current = Self::lock_journal(&mut tx, workspace_id, journal_id).await?;
        journal::check_archive(current.status()?)?;

        let query = format!(
            "UPDATE journals SET status = $2 WHERE id = $1 RETURNING {JOURNAL_COLUMNS}"
        );
        let archived = sqlx::query_as::<_, Journal>(&query)
            .bind(journal_id)
            .bind(JournalStatus::Archived.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            journal_id,
            workspace_id,
            actor_id = actor.user_id,
            "Journal archived"
        );

        Ok(archived)
    }

    /// Fetch and row-lock a journal within its workspace.
    async fn lock_journal(
        tx: &mut sqlx::PgTransaction<'_>,
        workspace_id: DbId,
        journal_id: DbId,
    ) -> DbResult<Journal> {
        let query = format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals
             WHERE id = $1 AND workspace_id = $2 FOR UPDATE"
        );
        sqlx::query_as::<_, Journal>(&query)
            .bind(journal_id)
            .bind(workspace_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| {
                CoreError::NotFound {
                    entity: "Journal",
                    id: journal_id,
                }
                .into()
            })
    }
}
