//! Review-request state machine and the audit-ledger fold.
//!
//! A request's stored status is a materialized projection of its append-only
//! action ledger: [`replay`] folds the ordered action kinds through
//! [`ReviewStatus::apply`] and must reproduce the stored column exactly.
//! The workflow engine updates both inside one transaction; integration
//! tests assert the equality after every transition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::note::NoteStatus;

/// Maximum length for a review comment or verdict note.
pub const MAX_COMMENT_LENGTH: usize = 5_000;

// ---------------------------------------------------------------------------
// ReviewStatus
// ---------------------------------------------------------------------------

/// Status of a review request.
///
/// `pending →(assign)→ in_review →(verdict)→ {approved | rejected |
/// changes_requested}`; `rejected` and `changes_requested` may reopen back
/// to `pending`. `approved` is terminal here — publication is a forward-only
/// act performed by the note lifecycle, not by this machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    InReview,
    Approved,
    Rejected,
    ChangesRequested,
}

impl ReviewStatus {
    /// The stored form, matching the `review_requests.status` CHECK
    /// constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::InReview => "in_review",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::ChangesRequested => "changes_requested",
        }
    }

    /// A verdict has been recorded; no further status-changing action except
    /// reopen is legal.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReviewStatus::Approved | ReviewStatus::Rejected | ReviewStatus::ChangesRequested
        )
    }

    /// An open request blocks creation of another request for the same note.
    pub fn is_open(self) -> bool {
        !self.is_terminal()
    }

    /// Reopening is only legal from a terminal, non-approved status.
    pub fn can_reopen(self) -> bool {
        matches!(self, ReviewStatus::Rejected | ReviewStatus::ChangesRequested)
    }

    /// Fold one ledger action into the status, validating the transition.
    ///
    /// `comment_added` and `revision_submitted` are status-neutral. Errors
    /// here indicate a corrupted ledger (the workflow engine never writes an
    /// illegal sequence), so they surface as `Internal`.
    pub fn apply(self, action: ActionKind) -> Result<ReviewStatus, CoreError> {
        let next = match (self, action) {
            (ReviewStatus::Pending | ReviewStatus::InReview, ActionKind::Assigned) => {
                ReviewStatus::InReview
            }
            (ReviewStatus::InReview, ActionKind::Approved) => ReviewStatus::Approved,
            (ReviewStatus::InReview, ActionKind::Rejected) => ReviewStatus::Rejected,
            (ReviewStatus::InReview, ActionKind::ChangesRequested) => {
                ReviewStatus::ChangesRequested
            }
            (status, ActionKind::Reopened) if status.can_reopen() => ReviewStatus::Pending,
            (status, ActionKind::CommentAdded | ActionKind::RevisionSubmitted) => status,
            (status, action) => {
                return Err(CoreError::Internal(format!(
                    "Ledger action '{action}' is not applicable to request status '{status}'"
                )))
            }
        };
        Ok(next)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReviewStatus::Pending),
            "in_review" => Ok(ReviewStatus::InReview),
            "approved" => Ok(ReviewStatus::Approved),
            "rejected" => Ok(ReviewStatus::Rejected),
            "changes_requested" => Ok(ReviewStatus::ChangesRequested),
            other => Err(CoreError::Internal(format!(
                "Unknown review status '{other}' in store"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// A reviewer's terminal decision on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Rejected,
    ChangesRequested,
}

impl Verdict {
    /// The request status this verdict transitions to.
    pub fn review_status(self) -> ReviewStatus {
        match self {
            Verdict::Approved => ReviewStatus::Approved,
            Verdict::Rejected => ReviewStatus::Rejected,
            Verdict::ChangesRequested => ReviewStatus::ChangesRequested,
        }
    }

    /// The ledger action recorded for this verdict.
    pub fn action(self) -> ActionKind {
        match self {
            Verdict::Approved => ActionKind::Approved,
            Verdict::Rejected => ActionKind::Rejected,
            Verdict::ChangesRequested => ActionKind::ChangesRequested,
        }
    }

    /// The note status this verdict atomically produces: approval promotes
    /// the note, any other verdict sends it back to draft for rework.
    pub fn note_status(self) -> NoteStatus {
        match self {
            Verdict::Approved => NoteStatus::Approved,
            Verdict::Rejected | Verdict::ChangesRequested => NoteStatus::Draft,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.review_status().as_str())
    }
}

// ---------------------------------------------------------------------------
// ReviewPriority
// ---------------------------------------------------------------------------

/// Priority of a review request. Informational only — no scheduling or
/// expiry is derived from it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

impl ReviewPriority {
    /// The stored form, matching the `review_requests.priority` CHECK
    /// constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewPriority::Low => "low",
            ReviewPriority::Normal => "normal",
            ReviewPriority::High => "high",
            ReviewPriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for ReviewPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewPriority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(ReviewPriority::Low),
            "normal" => Ok(ReviewPriority::Normal),
            "high" => Ok(ReviewPriority::High),
            "urgent" => Ok(ReviewPriority::Urgent),
            other => Err(CoreError::Validation(format!(
                "Invalid priority '{other}'. Must be one of: low, normal, high, urgent"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionKind
// ---------------------------------------------------------------------------

/// One entry kind in a request's append-only ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Submitted,
    Assigned,
    Approved,
    Rejected,
    ChangesRequested,
    CommentAdded,
    RevisionSubmitted,
    Reopened,
}

impl ActionKind {
    /// The stored form, matching the `review_actions.action` CHECK
    /// constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Submitted => "submitted",
            ActionKind::Assigned => "assigned",
            ActionKind::Approved => "approved",
            ActionKind::Rejected => "rejected",
            ActionKind::ChangesRequested => "changes_requested",
            ActionKind::CommentAdded => "comment_added",
            ActionKind::RevisionSubmitted => "revision_submitted",
            ActionKind::Reopened => "reopened",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(ActionKind::Submitted),
            "assigned" => Ok(ActionKind::Assigned),
            "approved" => Ok(ActionKind::Approved),
            "rejected" => Ok(ActionKind::Rejected),
            "changes_requested" => Ok(ActionKind::ChangesRequested),
            "comment_added" => Ok(ActionKind::CommentAdded),
            "revision_submitted" => Ok(ActionKind::RevisionSubmitted),
            "reopened" => Ok(ActionKind::Reopened),
            other => Err(CoreError::Internal(format!(
                "Unknown review action '{other}' in store"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger replay
// ---------------------------------------------------------------------------

/// Reconstruct a request's status by folding its ledger in creation order.
///
/// The first action must be `submitted` (every request is born from a
/// submission); each further action is validated by
/// [`ReviewStatus::apply`]. The result is the canonical status the stored
/// `review_requests.status` column must equal.
pub fn replay<I>(actions: I) -> Result<ReviewStatus, CoreError>
where
    I: IntoIterator<Item = ActionKind>,
{
    let mut iter = actions.into_iter();

    let status = match iter.next() {
        Some(ActionKind::Submitted) => ReviewStatus::Pending,
        Some(other) => {
            return Err(CoreError::Internal(format!(
                "Ledger must start with 'submitted', found '{other}'"
            )))
        }
        None => {
            return Err(CoreError::Internal(
                "Cannot replay an empty ledger".to_string(),
            ))
        }
    };

    iter.try_fold(status, |status, action| status.apply(action))
}

/// Validate free-text attached to comments and verdicts.
pub fn validate_comment(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation(
            "Comment text must not be empty".to_string(),
        ));
    }
    if text.len() > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters"
        )));
    }
    Ok(())
}
