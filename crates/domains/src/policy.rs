//! # Project Access Policy
//!
//! One table decides every project-scoped permission. Ownership implies
//! membership; structural changes to a project are reserved to its owner.
//! Comment edits are not governed by project role at all: only the author of
//! a comment may change or remove it.

use serde::Serialize;
use std::fmt;

use crate::models::UserId;

/// A user's relationship to one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectRole {
    None,
    Member,
    Owner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    EditProject,
    DeleteProject,
    AddMember,
    CreateTask,
    EditTask,
    DeleteTask,
    ReorderTasks,
    EditComment,
    DeleteComment,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::EditProject => "editProject",
            Action::DeleteProject => "deleteProject",
            Action::AddMember => "addMember",
            Action::CreateTask => "createTask",
            Action::EditTask => "editTask",
            Action::DeleteTask => "deleteTask",
            Action::ReorderTasks => "reorderTasks",
            Action::EditComment => "editComment",
            Action::DeleteComment => "deleteComment",
        }
    }

    /// Comment actions are decided by authorship, see [`authorize_author`].
    pub fn is_author_scoped(self) -> bool {
        matches!(self, Action::EditComment | Action::DeleteComment)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// The minimum project role an action needs, or `None` for author-scoped
/// actions which no project role grants.
pub fn required_role(action: Action) -> Option<ProjectRole> {
    match action {
        Action::View
        | Action::CreateTask
        | Action::EditTask
        | Action::DeleteTask
        | Action::ReorderTasks => Some(ProjectRole::Member),
        Action::EditProject | Action::DeleteProject | Action::AddMember => Some(ProjectRole::Owner),
        Action::EditComment | Action::DeleteComment => None,
    }
}

pub fn authorize(role: ProjectRole, action: Action) -> Decision {
    match required_role(action) {
        Some(required) if role >= required => Decision::Allow,
        _ => Decision::Deny,
    }
}

pub fn authorize_author(author: UserId, caller: UserId, action: Action) -> Decision {
    if action.is_author_scoped() && author == caller {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
