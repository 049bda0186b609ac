//! Transactional workflow engines.
//!
//! The three stateful components of the review system:
//!
//! - [`ReviewWorkflow`] — owns review requests and their transitions.
//! - [`NoteLifecycle`] — owns the explicit publish/archive actions.
//! - [`JournalAggregator`] — compiles published notes into journals.
//!
//! Every method owns exactly one transaction: it re-reads the rows it is
//! about to mutate with `FOR UPDATE`, checks the documented preconditions
//! against the caselog-core transition tables, performs all writes (status
//! update + ledger append, or journal insert + entry snapshot), and
//! commits. A precondition that no longer holds surfaces as `Conflict`
//! rather than an overwrite, so concurrent actors serialize on the row
//! locks and the loser gets a typed error.

use sqlx::PgTransaction;

use caselog_core::roles::Role;
use caselog_core::types::DbId;

use crate::models::note::Note;
use crate::models::review::ReviewRequest;
use crate::repositories::{note_repo, review_repo};

pub mod journal;
pub mod lifecycle;
pub mod review;

pub use journal::JournalAggregator;
pub use lifecycle::NoteLifecycle;
pub use review::ReviewWorkflow;

/// The authenticated caller of a workflow operation: their user id and
/// their role in the workspace the operation targets.
///
/// Handlers resolve this from the identity token plus the membership table
/// before calling in; the engines never look up roles themselves.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: DbId,
    pub role: Role,
}

/// Fetch and row-lock a note within its workspace.
pub(crate) async fn lock_note(
    tx: &mut PgTransaction<'_>,
    workspace_id: DbId,
    note_id: DbId,
) -> Result<Option<Note>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM notes WHERE id = $1 AND workspace_id = $2 FOR UPDATE",
        note_repo::COLUMNS
    );
    sqlx::query_as::<_, Note>(&query)
        .bind(note_id)
        .bind(workspace_id)
        .fetch_optional(&mut **tx)
        .await
}

/// Fetch and row-lock a review request within its workspace.
pub(crate) async fn lock_request(
    tx: &mut PgTransaction<'_>,
    workspace_id: DbId,
    request_id: DbId,
) -> Result<Option<ReviewRequest>, sqlx::Error> {
    let query = format!(
        "SELECT {} FROM review_requests WHERE id = $1 AND workspace_id = $2 FOR UPDATE",
        review_repo::REQUEST_COLUMNS
    );
    sqlx::query_as::<_, ReviewRequest>(&query)
        .bind(request_id)
        .bind(workspace_id)
        .fetch_optional(&mut **tx)
        .await
}
