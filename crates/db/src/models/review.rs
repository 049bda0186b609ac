//! Review request and audit-ledger entity models and DTOs.
//!
//! `ReviewAction` rows are immutable once created (no `updated_at`); the
//! request's `status` column is the materialized fold of its ledger.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use caselog_core::error::CoreError;
use caselog_core::review::{ActionKind, ReviewPriority, ReviewStatus, Verdict};
use caselog_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// ReviewRequest
// ---------------------------------------------------------------------------

/// A row from the `review_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewRequest {
    pub id: DbId,
    pub note_id: DbId,
    pub workspace_id: DbId,
    pub requester_id: DbId,
    pub reviewer_id: Option<DbId>,
    pub priority: String,
    pub due_date: Option<Timestamp>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ReviewRequest {
    /// The request's status, parsed from the stored form.
    pub fn status(&self) -> Result<ReviewStatus, CoreError> {
        self.status.parse()
    }

    /// The request's priority, parsed from the stored form.
    pub fn priority(&self) -> Result<ReviewPriority, CoreError> {
        self.priority.parse()
    }
}

// ---------------------------------------------------------------------------
// ReviewAction
// ---------------------------------------------------------------------------

/// A row from the `review_actions` table. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReviewAction {
    pub id: DbId,
    pub request_id: DbId,
    pub workspace_id: DbId,
    pub actor_id: DbId,
    pub action: String,
    pub note: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

impl ReviewAction {
    /// The entry's action kind, parsed from the stored form.
    pub fn kind(&self) -> Result<ActionKind, CoreError> {
        self.action.parse()
    }
}

/// Ledger entry to append, built by the workflow engine.
#[derive(Debug, Clone)]
pub struct NewReviewAction {
    pub request_id: DbId,
    pub workspace_id: DbId,
    pub actor_id: DbId,
    pub kind: ActionKind,
    pub note: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for submitting a note for review.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub reviewer_id: Option<DbId>,
    #[serde(default)]
    pub priority: ReviewPriority,
    pub due_date: Option<Timestamp>,
}

/// DTO for assigning (or reassigning) a reviewer.
#[derive(Debug, Deserialize)]
pub struct AssignReviewer {
    pub reviewer_id: DbId,
    pub priority: Option<ReviewPriority>,
    pub due_date: Option<Timestamp>,
}

/// DTO for recording a verdict.
#[derive(Debug, Deserialize)]
pub struct SubmitVerdict {
    pub verdict: Verdict,
    pub comment: Option<String>,
}

/// DTO for commenting on a request.
#[derive(Debug, Deserialize)]
pub struct AddComment {
    pub text: String,
}

/// Query parameters for listing review requests.
#[derive(Debug, Deserialize)]
pub struct ReviewListParams {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
