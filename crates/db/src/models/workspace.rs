//! Workspace and membership entity models.

use serde::Serialize;
use sqlx::FromRow;

use caselog_core::error::CoreError;
use caselog_core::roles::Role;
use caselog_core::types::{DbId, Timestamp};

/// A row from the `workspaces` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workspace {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `workspace_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkspaceMember {
    pub workspace_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
}

impl WorkspaceMember {
    /// The member's role, parsed from the stored form.
    pub fn role(&self) -> Result<Role, CoreError> {
        self.role.parse()
    }
}
