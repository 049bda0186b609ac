//! The note lifecycle engine: explicit publish and archive actions.
//!
//! These are the only note-status mutations that do not originate in
//! [`super::ReviewWorkflow`]. Neither action is legal while a review
//! request is open, so the two engines never race on the status column.

use sqlx::PgPool;

use caselog_core::error::CoreError;
use caselog_core::note::{self, NoteStatus};
use caselog_core::roles;
use caselog_core::types::DbId;

use crate::models::note::Note;
use crate::repositories::note_repo::COLUMNS as NOTE_COLUMNS;
use crate::workflow::{lock_note, Actor};
use crate::DbResult;

/// Forward-only publication actions on case notes.
pub struct NoteLifecycle;

impl NoteLifecycle {
    /// Publish an approved note, stamping `published_at`.
    ///
    /// Fails with `InvalidTransition` unless the note is `approved`,
    /// guaranteeing every published note passed review.
    pub async fn publish(
        pool: &PgPool,
        workspace_id: DbId,
        note_id: DbId,
        actor: Actor,
    ) -> DbResult<Note> {
        if !roles::can_publish_note(actor.role) {
            return Err(CoreError::Forbidden(
                "Only editors and admins may publish notes".to_string(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let current = lock_note(&mut tx, workspace_id, note_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Note",
                id: note_id,
            })?;

        note::check_publish(current.status()?)?;

        let query = format!(
            "UPDATE notes SET status = $2, published_at = NOW()
             WHERE id = $1
             RETURNING {NOTE_COLUMNS}"
        );
        let published = sqlx::query_as::<_, Note>(&query)
            .bind(note_id)
            .bind(NoteStatus::Published.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            note_id,
            workspace_id,
            actor_id = actor.user_id,
            "Note published"
        );

        Ok(published)
    }

    /// Archive a note. One-way; legal from any status except `archived`,
    /// but not while a review request is open.
    pub async fn archive(
        pool: &PgPool,
        workspace_id: DbId,
        note_id: DbId,
        actor: Actor,
    ) -> DbResult<Note> {
        if !roles::can_archive_note(actor.role) {
            return Err(CoreError::Forbidden(
                "Only editors and admins may archive notes".to_string(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let current = lock_note(&mut tx, workspace_id, note_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Note",
                id: note_id,
            })?;

        note::check_archive(current.status()?)?;

        let open_request = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM review_requests
                WHERE note_id = $1 AND status IN ('pending', 'in_review')
             )",
        )
        .bind(note_id)
        .fetch_one(&mut *tx)
        .await?;

        if open_request {
            return Err(CoreError::Conflict(
                "Cannot archive a note with an open review request".to_string(),
            )
            .into());
        }

        let query = format!(
            "UPDATE notes SET status = $2 WHERE id = $1 RETURNING {NOTE_COLUMNS}"
        );
        let archived = sqlx::query_as::<_, Note>(&query)
            .bind(note_id)
            .bind(NoteStatus::Archived.as_str())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            note_id,
            workspace_id,
            actor_id = actor.user_id,
            "Note archived"
        );

        Ok(archived)
    }
}
