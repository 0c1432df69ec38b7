//! # Authorization Guard
//!
//! Sits in front of every project, task and comment mutation. It combines
//! the Membership Resolver's verdict with the policy table in
//! `domains::policy` and turns a denial into the right error kind:
//!
//! - a caller with no relation to the project asking to `view` it gets
//!   `NotFound`, so project ids cannot be probed;
//! - every other denial is `Forbidden`.
//!
//! Denials are logged with actor, resource and action for audit.

use domains::{
    authorize, authorize_author, Action, Comment, DomainError, DomainResult, Project, ProjectId,
    ProjectRole, UserId,
};

use crate::membership::MembershipResolver;

#[derive(Clone)]
pub struct AuthorizationGuard {
    resolver: MembershipResolver,
}

impl AuthorizationGuard {
    pub fn new(resolver: MembershipResolver) -> Self {
        Self { resolver }
    }

    /// Loads the project, resolves the caller's role and gates `action`.
    /// Returns the project so the caller can keep working with it.
    pub async fn require(&self, actor: UserId, project_id: ProjectId, action: Action) -> DomainResult<Project> {
        let (project, role) = self.resolver.load(project_id, actor).await?;
        self.check(&project, actor, role, action)?;
        Ok(project)
    }

    /// Gates `action` for an already loaded project and role.
    pub fn check(&self, project: &Project, actor: UserId, role: ProjectRole, action: Action) -> DomainResult<()> {
        if authorize(role, action).is_allowed() {
            return Ok(());
        }

        tracing::warn!(
            actor = %actor,
            resource = "project",
            resource_id = %project.id,
            action = %action,
            role = ?role,
            "authorization denied"
        );

        if role == ProjectRole::None && action == Action::View {
            return Err(DomainError::not_found("Project", project.id));
        }
        Err(DomainError::forbidden(denial_message(role, action)))
    }

    /// Comment edits and deletes are reserved to the comment's author.
    pub fn require_author(&self, comment: &Comment, actor: UserId, action: Action) -> DomainResult<()> {
        if authorize_author(comment.user_id, actor, action).is_allowed() {
            return Ok(());
        }

        tracing::warn!(
            actor = %actor,
            resource = "comment",
            resource_id = %comment.id,
            action = %action,
            "authorization denied"
        );

        let verb = if action == Action::DeleteComment { "delete" } else { "edit" };
        Err(DomainError::forbidden(format!("Not authorized to {verb} this comment")))
    }
}

fn denial_message(role: ProjectRole, action: Action) -> &'static str {
    match (role, action) {
        (ProjectRole::None, _) => "You are not a member of this project",
        (_, Action::DeleteProject) => "Only the project owner can delete this project",
        (_, Action::AddMember) => "Only the project owner can add members",
        (_, Action::EditProject) => "Only the project owner can edit this project",
        _ => "You are not allowed to perform this action",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{MockProjectRepository, TaskId};
    use std::sync::Arc;

    fn guard_for(project: &Project) -> AuthorizationGuard {
        let stored = project.clone();
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        AuthorizationGuard::new(MembershipResolver::new(Arc::new(repo)))
    }

    #[tokio::test]
    async fn member_can_work_on_tasks_but_not_restructure() {
        let (owner, member) = (UserId::new(), UserId::new());
        let project = Project::new("Board", None, vec![member], owner).unwrap();
        let guard = guard_for(&project);

        assert!(guard.require(member, project.id, Action::ReorderTasks).await.is_ok());
        let err = guard
            .require(member, project.id, Action::DeleteProject)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(guard.require(owner, project.id, Action::DeleteProject).await.is_ok());
    }

    #[tokio::test]
    async fn stranger_view_is_masked_and_mutation_is_forbidden() {
        let project = Project::new("Board", None, vec![], UserId::new()).unwrap();
        let guard = guard_for(&project);
        let stranger = UserId::new();

        let err = guard.require(stranger, project.id, Action::View).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = guard
            .require(stranger, project.id, Action::DeleteProject)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn only_author_may_touch_comment() {
        let project = Project::new("Board", None, vec![], UserId::new()).unwrap();
        let guard = guard_for(&project);
        let author = UserId::new();
        let comment = Comment::new(TaskId::new(), author, "hello", None).unwrap();

        assert!(guard.require_author(&comment, author, Action::EditComment).is_ok());
        let err = guard
            .require_author(&comment, project.created_by, Action::DeleteComment)
            .unwrap_err();
        assert_eq!(err, DomainError::forbidden("Not authorized to delete this comment"));
    }
}
