//! Shared seed helpers for data-layer integration tests.
//!
//! Workspace and user provisioning has no repository surface (it belongs to
//! the hosting platform), so tests seed those rows directly.

use sqlx::PgPool;

use caselog_core::roles::Role;
use caselog_core::types::DbId;
use caselog_db::models::note::CreateNote;
use caselog_db::workflow::Actor;

pub async fn seed_workspace(pool: &PgPool, name: &str) -> DbId {
    sqlx::query_scalar("INSERT INTO workspaces (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("workspace insert should succeed")
}

pub async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO users (email, display_name) VALUES ($1, $2) RETURNING id",
    )
    .bind(email)
    .bind(email.split('@').next().unwrap_or(email))
    .fetch_one(pool)
    .await
    .expect("user insert should succeed")
}

pub async fn add_member(pool: &PgPool, workspace_id: DbId, user_id: DbId, role: Role) {
    sqlx::query(
        "INSERT INTO workspace_members (workspace_id, user_id, role) VALUES ($1, $2, $3)",
    )
    .bind(workspace_id)
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await
    .expect("membership insert should succeed");
}

/// Seed a member user in one call, returning their workflow actor.
pub async fn seed_member(pool: &PgPool, workspace_id: DbId, email: &str, role: Role) -> Actor {
    let user_id = seed_user(pool, email).await;
    add_member(pool, workspace_id, user_id, role).await;
    Actor { user_id, role }
}

pub fn new_note(title: &str) -> CreateNote {
    CreateNote {
        title: title.to_string(),
        body: "Patient stable overnight. Continue current medication.".to_string(),
        topic: None,
        tags: vec![],
        recommend_for_journal: false,
    }
}

/// Insert a note directly in `published` status with a chosen publication
/// timestamp, for journal-selection tests.
pub async fn seed_published_note(
    pool: &PgPool,
    workspace_id: DbId,
    author_id: DbId,
    title: &str,
    published_at: &str,
    recommend: bool,
) -> DbId {
    sqlx::query_scalar(
        "INSERT INTO notes
            (workspace_id, author_id, title, body, status, published_at, recommend_for_journal)
         VALUES ($1, $2, $3, 'Case summary.', 'published', $4::timestamptz, $5)
         RETURNING id",
    )
    .bind(workspace_id)
    .bind(author_id)
    .bind(title)
    .bind(published_at)
    .bind(recommend)
    .fetch_one(pool)
    .await
    .expect("published note insert should succeed")
}
