//! Per-workspace role resolution.
//!
//! Every workspace-scoped handler resolves the caller into a workflow
//! [`Actor`] before doing anything else. Non-membership reports the
//! workspace as `NotFound` — the same response an absent workspace
//! produces — so existence never leaks across tenant boundaries.

use caselog_core::error::CoreError;
use caselog_core::types::DbId;
use caselog_db::repositories::WorkspaceMemberRepo;
use caselog_db::workflow::Actor;
use caselog_db::DbPool;

use crate::error::AppResult;

/// Resolve the caller's membership in a workspace, or fail with `NotFound`.
pub async fn require_member(
    pool: &DbPool,
    workspace_id: DbId,
    user_id: DbId,
) -> AppResult<Actor> {
    let member = WorkspaceMemberRepo::find(pool, workspace_id, user_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Workspace",
            id: workspace_id,
        })?;

    Ok(Actor {
        user_id,
        role: member.role()?,
    })
}
