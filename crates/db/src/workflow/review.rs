//! The review-request engine.
//!
//! Owns every status transition of a review request and the note mutations
//! those transitions imply. Each operation appends to the action ledger in
//! the same transaction as its status write, keeping the stored status
//! equal to the fold of the ledger at every commit point.

use serde_json::json;
use sqlx::PgPool;

use caselog_core::error::CoreError;
use caselog_core::note::NoteStatus;
use caselog_core::review::{validate_comment, ActionKind, ReviewStatus};
use caselog_core::roles;
use caselog_core::types::DbId;

use crate::models::review::{
    AssignReviewer, CreateReviewRequest, NewReviewAction, ReviewAction, ReviewRequest,
    SubmitVerdict,
};
use crate::repositories::review_repo::REQUEST_COLUMNS;
use crate::repositories::ReviewActionRepo;
use crate::workflow::{lock_note, lock_request, Actor};
use crate::DbResult;

/// Review-request state machine over the transactional store.
pub struct ReviewWorkflow;

impl ReviewWorkflow {
    /// Submit a note for review, creating a pending request.
    ///
    /// Fails with `Conflict` if an open request already exists for the
    /// note, and with `InvalidTransition` if the note is not a draft.
    /// Atomically sets the note to `under_review` and appends a
    /// `submitted` ledger entry.
    pub async fn create(
        pool: &PgPool,
        workspace_id: DbId,
        note_id: DbId,
        actor: Actor,
        input: &CreateReviewRequest,
    ) -> DbResult<ReviewRequest> {
        if !roles::can_submit_for_review(actor.role) {
            return Err(CoreError::Forbidden(
                "Viewers cannot submit notes for review".to_string(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        // The note row is the serialization anchor for the
        // one-open-request-per-note invariant.
        let note = lock_note(&mut tx, workspace_id, note_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Note",
                id: note_id,
            })?;

        if actor.user_id != note.author_id && !roles::can_assign_reviewer(actor.role) {
            return Err(CoreError::Forbidden(
                "Only the note's author or an editor may submit it for review".to_string(),
            )
            .into());
        }

        let open_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM review_requests
                WHERE note_id = $1 AND status IN ('pending', 'in_review')
             )",
        )
        .bind(note_id)
        .fetch_one(&mut *tx)
        .await?;

        if open_exists {
            return Err(CoreError::Conflict(
                "An open review request already exists for this note".to_string(),
            )
            .into());
        }

        let status = note.status()?;
        if !status.can_enter_review() {
            return Err(CoreError::InvalidTransition(format!(
                "Cannot submit a note in status '{status}' for review"
            ))
            .into());
        }

        let query = format!(
            "INSERT INTO review_requests
                (note_id, workspace_id, requester_id, reviewer_id, priority, due_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REQUEST_COLUMNS}"
        );
        let request = sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(note_id)
            .bind(workspace_id)
            .bind(actor.user_id)
            .bind(input.reviewer_id)
            .bind(input.priority.as_str())
            .bind(input.due_date)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE notes SET status = $2 WHERE id = $1")
            .bind(note_id)
            .bind(NoteStatus::UnderReview.as_str())
            .execute(&mut *tx)
            .await?;

        ReviewActionRepo::append(
            &mut *tx,
            &NewReviewAction {
                request_id: request.id,
                workspace_id,
                actor_id: actor.user_id,
                kind: ActionKind::Submitted,
                note: None,
                metadata: None,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id = request.id,
            note_id,
            workspace_id,
            requester_id = actor.user_id,
            "Review request created"
        );

        Ok(request)
    }

    /// Assign (or reassign) a reviewer, moving the request to `in_review`.
    ///
    /// Requires the editor or admin capability. A request that is no
    /// longer open reports `NotFound`, matching the read surface an
    /// assigning editor works from.
    pub async fn assign_reviewer(
        pool: &PgPool,
        workspace_id: DbId,
        request_id: DbId,
        actor: Actor,
        input: &AssignReviewer,
    ) -> DbResult<ReviewRequest> {
        if !roles::can_assign_reviewer(actor.role) {
            return Err(CoreError::Forbidden(
                "Only editors and admins may assign reviewers".to_string(),
            )
            .into());
        }

        let mut tx = pool.begin().await?;

        let request = lock_request(&mut tx, workspace_id, request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ReviewRequest",
                id: request_id,
            })?;

        let status = request.status()?;
        if !status.is_open() {
            return Err(CoreError::NotFound {
                entity: "ReviewRequest",
                id: request_id,
            }
            .into());
        }

        let reviewer_is_member = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM workspace_members
                WHERE workspace_id = $1 AND user_id = $2
             )",
        )
        .bind(workspace_id)
        .bind(input.reviewer_id)
        .fetch_one(&mut *tx)
        .await?;

        if !reviewer_is_member {
            return Err(CoreError::Validation(
                "Reviewer is not a member of this workspace".to_string(),
            )
            .into());
        }

        let next = status.apply(ActionKind::Assigned)?;

        let query = format!(
            "UPDATE review_requests SET
                reviewer_id = $2,
                status = $3,
                priority = COALESCE($4, priority),
                due_date = COALESCE($5, due_date)
             WHERE id = $1
             RETURNING {REQUEST_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(request_id)
            .bind(input.reviewer_id)
            .bind(next.as_str())
            .bind(input.priority.map(|p| p.as_str()))
            .bind(input.due_date)
            .fetch_one(&mut *tx)
            .await?;

        ReviewActionRepo::append(
            &mut *tx,
            &NewReviewAction {
                request_id,
                workspace_id,
                actor_id: actor.user_id,
                kind: ActionKind::Assigned,
                note: None,
                metadata: Some(json!({ "reviewer_id": input.reviewer_id })),
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id,
            workspace_id,
            reviewer_id = input.reviewer_id,
            actor_id = actor.user_id,
            "Reviewer assigned"
        );

        Ok(updated)
    }

    /// Record a verdict, ending the request and mutating the note.
    ///
    /// Only the assigned reviewer (or an admin) decides. A request that has
    /// already been decided reports `Conflict` — this is the stale-writer
    /// path when two verdicts race. Approval promotes the note to
    /// `approved`; rejection or a changes request sends it back to `draft`.
    pub async fn submit_verdict(
        pool: &PgPool,
        workspace_id: DbId,
        request_id: DbId,
        actor: Actor,
        input: &SubmitVerdict,
    ) -> DbResult<ReviewRequest> {
        if let Some(comment) = &input.comment {
            validate_comment(comment)?;
        }

        let mut tx = pool.begin().await?;

        let request = lock_request(&mut tx, workspace_id, request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ReviewRequest",
                id: request_id,
            })?;

        let status = request.status()?;
        if status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Review request has already been decided ('{status}')"
            ))
            .into());
        }
        if status != ReviewStatus::InReview {
            return Err(CoreError::InvalidTransition(
                "Cannot record a verdict before a reviewer is assigned".to_string(),
            )
            .into());
        }

        let is_assigned = request.reviewer_id == Some(actor.user_id);
        if !roles::can_submit_verdict(actor.role, is_assigned) {
            return Err(CoreError::Forbidden(
                "Only the assigned reviewer or an admin may submit a verdict".to_string(),
            )
            .into());
        }

        let next = status.apply(input.verdict.action())?;

        let query = format!(
            "UPDATE review_requests SET status = $2 WHERE id = $1
             RETURNING {REQUEST_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(request_id)
            .bind(next.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let note = lock_note(&mut tx, workspace_id, request.note_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Note",
                id: request.note_id,
            })?;

        if note.status()? != NoteStatus::UnderReview {
            return Err(CoreError::Conflict(
                "Note is no longer under review".to_string(),
            )
            .into());
        }

        sqlx::query("UPDATE notes SET status = $2 WHERE id = $1")
            .bind(note.id)
            .bind(input.verdict.note_status().as_str())
            .execute(&mut *tx)
            .await?;

        ReviewActionRepo::append(
            &mut *tx,
            &NewReviewAction {
                request_id,
                workspace_id,
                actor_id: actor.user_id,
                kind: input.verdict.action(),
                note: input.comment.clone(),
                metadata: None,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id,
            workspace_id,
            note_id = request.note_id,
            actor_id = actor.user_id,
            verdict = %input.verdict,
            "Verdict recorded"
        );

        Ok(updated)
    }

    /// Reopen a rejected / changes-requested request back to `pending`.
    ///
    /// Clears the reviewer, returns the note to `under_review`, and appends
    /// a `reopened` ledger entry. `approved` is not reopenable.
    pub async fn reopen(
        pool: &PgPool,
        workspace_id: DbId,
        request_id: DbId,
        actor: Actor,
    ) -> DbResult<ReviewRequest> {
        let mut tx = pool.begin().await?;

        let request = lock_request(&mut tx, workspace_id, request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ReviewRequest",
                id: request_id,
            })?;

        let is_requester = request.requester_id == actor.user_id;
        if !roles::can_reopen_review(actor.role, is_requester) {
            return Err(CoreError::Forbidden(
                "Only the requester, an editor, or an admin may reopen a review".to_string(),
            )
            .into());
        }

        let status = request.status()?;
        if !status.can_reopen() {
            return Err(CoreError::InvalidTransition(format!(
                "Cannot reopen a review request in status '{status}'"
            ))
            .into());
        }

        let next = status.apply(ActionKind::Reopened)?;

        let query = format!(
            "UPDATE review_requests SET status = $2, reviewer_id = NULL
             WHERE id = $1
             RETURNING {REQUEST_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, ReviewRequest>(&query)
            .bind(request_id)
            .bind(next.as_str())
            .fetch_one(&mut *tx)
            .await?;

        let note = lock_note(&mut tx, workspace_id, request.note_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Note",
                id: request.note_id,
            })?;

        // After a reject/changes verdict the note sits in draft; anything
        // else means the author moved on (e.g. archived it) and the cycle
        // must not be restarted.
        if note.status()? != NoteStatus::Draft {
            return Err(CoreError::InvalidTransition(format!(
                "Cannot reopen review for a note in status '{}'",
                note.status
            ))
            .into());
        }

        sqlx::query("UPDATE notes SET status = $2 WHERE id = $1")
            .bind(note.id)
            .bind(NoteStatus::UnderReview.as_str())
            .execute(&mut *tx)
            .await?;

        ReviewActionRepo::append(
            &mut *tx,
            &NewReviewAction {
                request_id,
                workspace_id,
                actor_id: actor.user_id,
                kind: ActionKind::Reopened,
                note: None,
                metadata: None,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id,
            workspace_id,
            actor_id = actor.user_id,
            "Review request reopened"
        );

        Ok(updated)
    }

    /// Append a free-text comment to a request's ledger.
    ///
    /// Legal in any request state; never touches status.
    pub async fn add_comment(
        pool: &PgPool,
        workspace_id: DbId,
        request_id: DbId,
        actor: Actor,
        text: &str,
    ) -> DbResult<ReviewAction> {
        if !roles::can_comment(actor.role) {
            return Err(CoreError::Forbidden(
                "Viewers cannot comment on review requests".to_string(),
            )
            .into());
        }
        validate_comment(text)?;

        let request = crate::repositories::ReviewRequestRepo::find_in_workspace(
            pool,
            workspace_id,
            request_id,
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ReviewRequest",
            id: request_id,
        })?;

        let action = ReviewActionRepo::append(
            pool,
            &NewReviewAction {
                request_id: request.id,
                workspace_id,
                actor_id: actor.user_id,
                kind: ActionKind::CommentAdded,
                note: Some(text.to_string()),
                metadata: None,
            },
        )
        .await?;

        tracing::info!(
            request_id,
            workspace_id,
            actor_id = actor.user_id,
            "Review comment added"
        );

        Ok(action)
    }

    /// Record that the author has submitted revised note content.
    ///
    /// Status-neutral ledger entry; legal only while the request is open
    /// and only for the note's author.
    pub async fn submit_revision(
        pool: &PgPool,
        workspace_id: DbId,
        request_id: DbId,
        actor: Actor,
    ) -> DbResult<ReviewAction> {
        let mut tx = pool.begin().await?;

        let request = lock_request(&mut tx, workspace_id, request_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "ReviewRequest",
                id: request_id,
            })?;

        let status = request.status()?;
        if !status.is_open() {
            return Err(CoreError::InvalidTransition(format!(
                "Cannot submit a revision on a request in status '{status}'"
            ))
            .into());
        }

        let note = lock_note(&mut tx, workspace_id, request.note_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Note",
                id: request.note_id,
            })?;

        if note.author_id != actor.user_id {
            return Err(CoreError::Forbidden(
                "Only the note's author may submit a revision".to_string(),
            )
            .into());
        }

        let action = ReviewActionRepo::append(
            &mut *tx,
            &NewReviewAction {
                request_id: request.id,
                workspace_id,
                actor_id: actor.user_id,
                kind: ActionKind::RevisionSubmitted,
                note: None,
                metadata: None,
            },
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            request_id,
            workspace_id,
            actor_id = actor.user_id,
            "Revision recorded on review request"
        );

        Ok(action)
    }
}
