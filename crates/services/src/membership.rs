//! # Membership Resolver
//!
//! Answers "what is this user to this project?" from the stored project
//! document. Pure read, no side effects.

use std::sync::Arc;

use domains::{DomainError, DomainResult, Project, ProjectId, ProjectRepository, ProjectRole, UserId};

#[derive(Clone)]
pub struct MembershipResolver {
    projects: Arc<dyn ProjectRepository>,
}

impl MembershipResolver {
    pub fn new(projects: Arc<dyn ProjectRepository>) -> Self {
        Self { projects }
    }

    /// Fails with `NotFound` when the project does not exist.
    pub async fn resolve(&self, project_id: ProjectId, user: UserId) -> DomainResult<ProjectRole> {
        self.load(project_id, user).await.map(|(_, role)| role)
    }

    /// Like [`resolve`](Self::resolve) but also hands back the project so
    /// callers do not read it twice.
    pub async fn load(&self, project_id: ProjectId, user: UserId) -> DomainResult<(Project, ProjectRole)> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Project", project_id))?;
        let role = project.role_of(user);
        Ok((project, role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockProjectRepository;

    fn resolver_with(project: Option<Project>) -> MembershipResolver {
        let mut repo = MockProjectRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(project.clone()));
        MembershipResolver::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn resolves_owner_member_and_stranger() {
        let (owner, member, stranger) = (UserId::new(), UserId::new(), UserId::new());
        let project = Project::new("Board", None, vec![member], owner).unwrap();
        let id = project.id;
        let resolver = resolver_with(Some(project));

        assert_eq!(resolver.resolve(id, owner).await.unwrap(), ProjectRole::Owner);
        assert_eq!(resolver.resolve(id, member).await.unwrap(), ProjectRole::Member);
        assert_eq!(resolver.resolve(id, stranger).await.unwrap(), ProjectRole::None);
    }

    #[tokio::test]
    async fn owner_missing_from_member_list_is_still_owner() {
        let owner = UserId::new();
        let mut project = Project::new("Board", None, vec![], owner).unwrap();
        project.members.clear();
        let id = project.id;

        let role = resolver_with(Some(project)).resolve(id, owner).await.unwrap();
        assert_eq!(role, ProjectRole::Owner);
    }

    #[tokio::test]
    async fn missing_project_is_not_found() {
        let err = resolver_with(None)
            .resolve(ProjectId::new(), UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { resource: "Project", .. }));
    }
}
