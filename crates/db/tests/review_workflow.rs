//! Integration tests for the review-request workflow engine.
//!
//! Exercises the full state machine against a real database: submission,
//! assignment, verdicts, reopen cycles, the one-open-request invariant,
//! capability enforcement, workspace scoping, and the equality between the
//! stored request status and the fold of the action ledger.

mod common;

use assert_matches::assert_matches;
use sqlx::PgPool;

use caselog_core::error::CoreError;
use caselog_core::review::{replay, ActionKind, ReviewPriority, ReviewStatus, Verdict};
use caselog_core::roles::Role;
use caselog_db::models::review::{AssignReviewer, CreateReviewRequest, SubmitVerdict};
use caselog_db::repositories::{NoteRepo, ReviewActionRepo, ReviewRequestRepo};
use caselog_db::workflow::{NoteLifecycle, ReviewWorkflow};
use caselog_db::DbError;

use common::{add_member, new_note, seed_member, seed_user, seed_workspace};

fn submit_input() -> CreateReviewRequest {
    CreateReviewRequest {
        reviewer_id: None,
        priority: ReviewPriority::Normal,
        due_date: None,
    }
}

fn assign_input(reviewer_id: i64) -> AssignReviewer {
    AssignReviewer {
        reviewer_id,
        priority: None,
        due_date: None,
    }
}

fn verdict_input(verdict: Verdict, comment: Option<&str>) -> SubmitVerdict {
    SubmitVerdict {
        verdict,
        comment: comment.map(str::to_string),
    }
}

/// Assert that replaying the request's ledger reproduces its stored status.
async fn assert_ledger_matches_status(pool: &PgPool, request_id: i64) {
    let request = sqlx::query_as::<_, caselog_db::models::review::ReviewRequest>(
        "SELECT id, note_id, workspace_id, requester_id, reviewer_id, priority, \
         due_date, status, created_at, updated_at FROM review_requests WHERE id = $1",
    )
    .bind(request_id)
    .fetch_one(pool)
    .await
    .unwrap();

    let actions = ReviewActionRepo::list_for_request(pool, request_id).await.unwrap();
    let kinds: Vec<ActionKind> = actions.iter().map(|a| a.kind().unwrap()).collect();

    assert_eq!(
        replay(kinds).unwrap(),
        request.status().unwrap(),
        "stored status must equal the ledger fold"
    );
}

// ---------------------------------------------------------------------------
// The documented end-to-end scenario
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_submit_assign_reject_reopen_cycle(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;
    let reviewer = seed_member(&pool, ws, "reviewer@hospital.test", Role::Contributor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 12 ward round"))
        .await
        .unwrap();
    assert_eq!(note.status, "draft");

    // Submit: request pending, note under_review.
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    assert_eq!(request.status().unwrap(), ReviewStatus::Pending);
    assert_eq!(request.requester_id, author.user_id);

    let note = NoteRepo::find_in_workspace(&pool, ws, note.id).await.unwrap().unwrap();
    assert_eq!(note.status, "under_review");
    assert_ledger_matches_status(&pool, request.id).await;

    // Assign: request in_review, ledger [submitted, assigned].
    let request = ReviewWorkflow::assign_reviewer(
        &pool,
        ws,
        request.id,
        editor,
        &assign_input(reviewer.user_id),
    )
    .await
    .unwrap();
    assert_eq!(request.status().unwrap(), ReviewStatus::InReview);
    assert_eq!(request.reviewer_id, Some(reviewer.user_id));

    let actions = ReviewActionRepo::list_for_request(&pool, request.id).await.unwrap();
    let kinds: Vec<ActionKind> = actions.iter().map(|a| a.kind().unwrap()).collect();
    assert_eq!(kinds, vec![ActionKind::Submitted, ActionKind::Assigned]);
    assert_eq!(
        actions[1].metadata.as_ref().unwrap()["reviewer_id"],
        reviewer.user_id
    );
    assert_ledger_matches_status(&pool, request.id).await;

    // Reject: request rejected, note back to draft.
    let request = ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        reviewer,
        &verdict_input(Verdict::Rejected, Some("Dosage table is missing units.")),
    )
    .await
    .unwrap();
    assert_eq!(request.status().unwrap(), ReviewStatus::Rejected);

    let note = NoteRepo::find_in_workspace(&pool, ws, note.id).await.unwrap().unwrap();
    assert_eq!(note.status, "draft");
    assert_ledger_matches_status(&pool, request.id).await;

    // Reopen: request pending again, reviewer cleared, note under_review.
    let request = ReviewWorkflow::reopen(&pool, ws, request.id, author).await.unwrap();
    assert_eq!(request.status().unwrap(), ReviewStatus::Pending);
    assert_eq!(request.reviewer_id, None);

    let note = NoteRepo::find_in_workspace(&pool, ws, note.id).await.unwrap().unwrap();
    assert_eq!(note.status, "under_review");

    let actions = ReviewActionRepo::list_for_request(&pool, request.id).await.unwrap();
    let kinds: Vec<ActionKind> = actions.iter().map(|a| a.kind().unwrap()).collect();
    assert_eq!(
        kinds,
        vec![
            ActionKind::Submitted,
            ActionKind::Assigned,
            ActionKind::Rejected,
            ActionKind::Reopened,
        ]
    );
    assert_ledger_matches_status(&pool, request.id).await;
}

// ---------------------------------------------------------------------------
// One open request per note
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_second_open_request_conflicts(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 3")).await.unwrap();
    ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input()).await.unwrap();

    let result = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input()).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Conflict(_))));

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM review_requests WHERE note_id = $1")
            .bind(note.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1, "the failed submission must not create rows");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_new_request_allowed_after_terminal_verdict(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 4")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
        .await
        .unwrap();
    ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        editor,
        &verdict_input(Verdict::Rejected, None),
    )
    .await
    .unwrap();

    // The old cycle is terminal and the note is a draft again, so a fresh
    // submission opens a second, independent request.
    let second = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    assert_ne!(second.id, request.id);
    assert_eq!(second.status().unwrap(), ReviewStatus::Pending);
}

// ---------------------------------------------------------------------------
// Verdict preconditions and the stale-writer race
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_second_verdict_conflicts(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;
    let admin = seed_member(&pool, ws, "admin@hospital.test", Role::Admin).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 5")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
        .await
        .unwrap();

    ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        editor,
        &verdict_input(Verdict::Approved, None),
    )
    .await
    .unwrap();

    // The second writer observes a terminal status and must not
    // double-transition the note.
    let result = ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        admin,
        &verdict_input(Verdict::Rejected, None),
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::Conflict(_))));

    let note = NoteRepo::find_in_workspace(&pool, ws, note.id).await.unwrap().unwrap();
    assert_eq!(note.status, "approved", "the losing verdict must not touch the note");
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_verdict_before_assignment_rejected(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let admin = seed_member(&pool, ws, "admin@hospital.test", Role::Admin).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 6")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();

    let result = ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        admin,
        &verdict_input(Verdict::Approved, None),
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::InvalidTransition(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unassigned_reviewer_cannot_verdict(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;
    let reviewer = seed_member(&pool, ws, "reviewer@hospital.test", Role::Contributor).await;
    let bystander = seed_member(&pool, ws, "bystander@hospital.test", Role::Contributor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 7")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(reviewer.user_id))
        .await
        .unwrap();

    let result = ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        bystander,
        &verdict_input(Verdict::Approved, None),
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::Forbidden(_))));
}

// ---------------------------------------------------------------------------
// Reopen legality
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_reopen_from_pending_and_in_review_rejected(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 8")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();

    // pending
    let result = ReviewWorkflow::reopen(&pool, ws, request.id, author).await;
    assert_matches!(result, Err(DbError::Core(CoreError::InvalidTransition(_))));

    // in_review
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
        .await
        .unwrap();
    let result = ReviewWorkflow::reopen(&pool, ws, request.id, author).await;
    assert_matches!(result, Err(DbError::Core(CoreError::InvalidTransition(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_reopen_from_approved_rejected(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 9")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
        .await
        .unwrap();
    ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        editor,
        &verdict_input(Verdict::Approved, None),
    )
    .await
    .unwrap();

    let result = ReviewWorkflow::reopen(&pool, ws, request.id, editor).await;
    assert_matches!(result, Err(DbError::Core(CoreError::InvalidTransition(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_unrelated_contributor_cannot_reopen(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;
    let other = seed_member(&pool, ws, "other@hospital.test", Role::Contributor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 10")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
        .await
        .unwrap();
    ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        editor,
        &verdict_input(Verdict::ChangesRequested, Some("Add vitals chart.")),
    )
    .await
    .unwrap();

    let result = ReviewWorkflow::reopen(&pool, ws, request.id, other).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Forbidden(_))));

    // The requester themselves may.
    ReviewWorkflow::reopen(&pool, ws, request.id, author).await.unwrap();
}

// ---------------------------------------------------------------------------
// Capability enforcement on assignment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_contributor_cannot_assign(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 11")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();

    let result =
        ReviewWorkflow::assign_reviewer(&pool, ws, request.id, author, &assign_input(author.user_id))
            .await;
    assert_matches!(result, Err(DbError::Core(CoreError::Forbidden(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_assign_on_decided_request_reports_not_found(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 12")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
        .await
        .unwrap();
    ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        editor,
        &verdict_input(Verdict::Approved, None),
    )
    .await
    .unwrap();

    let result =
        ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
            .await;
    assert_matches!(result, Err(DbError::Core(CoreError::NotFound { .. })));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_reviewer_must_be_workspace_member(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;
    let outsider = seed_user(&pool, "outsider@elsewhere.test").await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 13")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();

    let result =
        ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(outsider))
            .await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Workspace scoping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_cross_workspace_access_reports_not_found(pool: PgPool) {
    let ws_a = seed_workspace(&pool, "icu").await;
    let ws_b = seed_workspace(&pool, "radiology").await;
    let author = seed_member(&pool, ws_a, "author@hospital.test", Role::Contributor).await;
    let editor_b = seed_member(&pool, ws_b, "editor-b@hospital.test", Role::Editor).await;
    add_member(&pool, ws_b, author.user_id, Role::Contributor).await;

    let note = NoteRepo::create(&pool, ws_a, author.user_id, &new_note("Bed 14")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws_a, note.id, author, &submit_input())
        .await
        .unwrap();

    // Reads scoped to the wrong workspace see nothing.
    let found = ReviewRequestRepo::find_in_workspace(&pool, ws_b, request.id).await.unwrap();
    assert!(found.is_none());

    // Mutations scoped to the wrong workspace fail with NotFound, not
    // Forbidden -- existence must not leak.
    let result = ReviewWorkflow::assign_reviewer(
        &pool,
        ws_b,
        request.id,
        editor_b,
        &assign_input(editor_b.user_id),
    )
    .await;
    assert_matches!(result, Err(DbError::Core(CoreError::NotFound { .. })));
}

// ---------------------------------------------------------------------------
// Comments and revisions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_blank_comment_rejected(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 15")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();

    let result = ReviewWorkflow::add_comment(&pool, ws, request.id, author, "   ").await;
    assert_matches!(result, Err(DbError::Core(CoreError::Validation(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_comment_allowed_on_terminal_request(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 16")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
        .await
        .unwrap();
    ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        editor,
        &verdict_input(Verdict::Rejected, None),
    )
    .await
    .unwrap();

    // Commenting never touches status.
    ReviewWorkflow::add_comment(&pool, ws, request.id, author, "Will revise tomorrow.")
        .await
        .unwrap();
    assert_ledger_matches_status(&pool, request.id).await;

    let request = ReviewRequestRepo::find_in_workspace(&pool, ws, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request.status().unwrap(), ReviewStatus::Rejected);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_only_author_submits_revision(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 17")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();

    let result = ReviewWorkflow::submit_revision(&pool, ws, request.id, editor).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Forbidden(_))));

    let action = ReviewWorkflow::submit_revision(&pool, ws, request.id, author).await.unwrap();
    assert_eq!(action.action, "revision_submitted");
    assert_ledger_matches_status(&pool, request.id).await;
}

// ---------------------------------------------------------------------------
// Publication invariant
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn test_published_note_has_prior_approved_action(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 18")).await.unwrap();
    let request = ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input())
        .await
        .unwrap();
    ReviewWorkflow::assign_reviewer(&pool, ws, request.id, editor, &assign_input(editor.user_id))
        .await
        .unwrap();
    ReviewWorkflow::submit_verdict(
        &pool,
        ws,
        request.id,
        editor,
        &verdict_input(Verdict::Approved, None),
    )
    .await
    .unwrap();

    let published = NoteLifecycle::publish(&pool, ws, note.id, editor).await.unwrap();
    let published_at = published.published_at.expect("publish must stamp published_at");

    let actions = ReviewActionRepo::list_for_request(&pool, request.id).await.unwrap();
    let approved = actions
        .iter()
        .find(|a| a.kind().unwrap() == ActionKind::Approved)
        .expect("a published note must have an approved action");
    assert!(
        approved.created_at < published_at,
        "the approval must strictly precede publication"
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_publish_requires_approved_status(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 19")).await.unwrap();

    let result = NoteLifecycle::publish(&pool, ws, note.id, editor).await;
    assert_matches!(result, Err(DbError::Core(CoreError::InvalidTransition(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_archive_blocked_by_open_request(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 20")).await.unwrap();
    ReviewWorkflow::create(&pool, ws, note.id, author, &submit_input()).await.unwrap();

    let result = NoteLifecycle::archive(&pool, ws, note.id, editor).await;
    assert_matches!(result, Err(DbError::Core(CoreError::Conflict(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_archive_is_one_way(pool: PgPool) {
    let ws = seed_workspace(&pool, "icu").await;
    let author = seed_member(&pool, ws, "author@hospital.test", Role::Contributor).await;
    let editor = seed_member(&pool, ws, "editor@hospital.test", Role::Editor).await;

    let note = NoteRepo::create(&pool, ws, author.user_id, &new_note("Bed 21")).await.unwrap();

    let archived = NoteLifecycle::archive(&pool, ws, note.id, editor).await.unwrap();
    assert_eq!(archived.status, "archived");

    let result = NoteLifecycle::archive(&pool, ws, note.id, editor).await;
    assert_matches!(result, Err(DbError::Core(CoreError::InvalidTransition(_))));
}
