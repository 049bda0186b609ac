//! Workspace roles and capability predicates.
//!
//! Roles are scoped per (workspace, user) in the `workspace_members` table.
//! Every operation that branches on the caller's role goes through one of
//! the `can_*` predicates below; handlers and workflow engines never compare
//! role strings directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A member's role within one workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Editor,
    Contributor,
    Viewer,
}

impl Role {
    /// The stored/wire form of the role, matching the
    /// `workspace_members.role` CHECK constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Contributor => "contributor",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "contributor" => Ok(Role::Contributor),
            "viewer" => Ok(Role::Viewer),
            other => Err(CoreError::Validation(format!(
                "Invalid role '{other}'. Must be one of: admin, editor, contributor, viewer"
            ))),
        }
    }
}

/// Whether the caller may author or edit case notes.
pub fn can_author_note(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Editor | Role::Contributor)
}

/// Whether the caller may create a review request for their own note.
pub fn can_submit_for_review(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Editor | Role::Contributor)
}

/// Whether the caller may assign (or reassign) a reviewer.
pub fn can_assign_reviewer(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Editor)
}

/// Whether the caller may submit a verdict on a request.
///
/// Only the assigned reviewer decides a request; admins may override, e.g.
/// when the assigned reviewer is unavailable.
pub fn can_submit_verdict(role: Role, is_assigned_reviewer: bool) -> bool {
    role == Role::Admin || is_assigned_reviewer
}

/// Whether the caller may reopen a rejected / changes-requested request.
///
/// The original requester may restart their own review cycle; editors and
/// admins may reopen any request in the workspace.
pub fn can_reopen_review(role: Role, is_requester: bool) -> bool {
    matches!(role, Role::Admin | Role::Editor) || is_requester
}

/// Whether the caller may edit notes they did not author.
pub fn can_edit_any_note(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Editor)
}

/// Whether the caller may comment on a review request. Viewers are
/// read-only members.
pub fn can_comment(role: Role) -> bool {
    !matches!(role, Role::Viewer)
}

/// Whether the caller may publish an approved note.
pub fn can_publish_note(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Editor)
}

/// Whether the caller may archive a note.
pub fn can_archive_note(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Editor)
}

/// Whether the caller may generate, publish, or archive a journal.
pub fn can_manage_journal(role: Role) -> bool {
    matches!(role, Role::Admin | Role::Editor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        for role in [Role::Admin, Role::Editor, Role::Contributor, Role::Viewer] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = "superuser".parse::<Role>();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid role"));
    }

    #[test]
    fn test_viewers_cannot_submit_for_review() {
        assert!(can_submit_for_review(Role::Contributor));
        assert!(can_submit_for_review(Role::Editor));
        assert!(!can_submit_for_review(Role::Viewer));
    }

    #[test]
    fn test_only_editors_and_admins_assign() {
        assert!(can_assign_reviewer(Role::Admin));
        assert!(can_assign_reviewer(Role::Editor));
        assert!(!can_assign_reviewer(Role::Contributor));
        assert!(!can_assign_reviewer(Role::Viewer));
    }

    #[test]
    fn test_assigned_reviewer_may_verdict_regardless_of_role() {
        assert!(can_submit_verdict(Role::Contributor, true));
        assert!(can_submit_verdict(Role::Viewer, true));
    }

    #[test]
    fn test_admin_may_verdict_without_assignment() {
        assert!(can_submit_verdict(Role::Admin, false));
        assert!(!can_submit_verdict(Role::Editor, false));
        assert!(!can_submit_verdict(Role::Contributor, false));
    }

    #[test]
    fn test_requester_may_reopen_own_request() {
        assert!(can_reopen_review(Role::Contributor, true));
        assert!(!can_reopen_review(Role::Contributor, false));
        assert!(can_reopen_review(Role::Editor, false));
    }

    #[test]
    fn test_publish_and_journal_capabilities_match() {
        for role in [Role::Admin, Role::Editor, Role::Contributor, Role::Viewer] {
            assert_eq!(can_publish_note(role), can_manage_journal(role));
        }
    }

    #[test]
    fn test_viewers_cannot_comment() {
        assert!(can_comment(Role::Contributor));
        assert!(!can_comment(Role::Viewer));
    }

    #[test]
    fn test_contributors_cannot_edit_others_notes() {
        assert!(can_edit_any_note(Role::Editor));
        assert!(!can_edit_any_note(Role::Contributor));
        assert!(!can_edit_any_note(Role::Viewer));
    }
}
