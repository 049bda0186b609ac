//! Repository for the `workspaces` and `workspace_members` tables.

use sqlx::PgPool;

use caselog_core::types::DbId;

use crate::models::workspace::{Workspace, WorkspaceMember};

/// Column list for `workspaces` queries.
const WORKSPACE_COLUMNS: &str = "id, name, created_at, updated_at";

/// Column list for `workspace_members` queries.
const MEMBER_COLUMNS: &str = "workspace_id, user_id, role, created_at";

/// Provides read operations for workspaces.
pub struct WorkspaceRepo;

impl WorkspaceRepo {
    /// Find a workspace by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workspace>, sqlx::Error> {
        let query = format!("SELECT {WORKSPACE_COLUMNS} FROM workspaces WHERE id = $1");
        sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides read operations for workspace membership.
pub struct WorkspaceMemberRepo;

impl WorkspaceMemberRepo {
    /// Find a user's membership row in a workspace.
    pub async fn find(
        pool: &PgPool,
        workspace_id: DbId,
        user_id: DbId,
    ) -> Result<Option<WorkspaceMember>, sqlx::Error> {
        let query = format!(
            "SELECT {MEMBER_COLUMNS} FROM workspace_members
             WHERE workspace_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, WorkspaceMember>(&query)
            .bind(workspace_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether the user is a member of the workspace, with any role.
    pub async fn is_member(
        pool: &PgPool,
        workspace_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM workspace_members
                WHERE workspace_id = $1 AND user_id = $2
             )",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
