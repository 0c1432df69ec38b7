//! # Project Service
//!
//! CRUD for projects plus member management. Deleting a project removes the
//! project document only; its tasks and comments stay in the store.

use std::sync::Arc;

use domains::{
    normalize_email, Action, Actor, DomainError, DomainResult, NewProject, Page, PageRequest,
    Project, ProjectId, ProjectPatch, ProjectRepository, UserId, UserRepository,
};

use crate::guard::AuthorizationGuard;
use crate::views::{ProjectView, UserLookup};

pub struct ProjectService {
    users: Arc<dyn UserRepository>,
    projects: Arc<dyn ProjectRepository>,
    guard: AuthorizationGuard,
    restrict_creation: bool,
}

impl ProjectService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        projects: Arc<dyn ProjectRepository>,
        guard: AuthorizationGuard,
        restrict_creation: bool,
    ) -> Self {
        Self {
            users,
            projects,
            guard,
            restrict_creation,
        }
    }

    /// Creates a project owned by `actor`. Member emails that match no user
    /// are dropped silently.
    pub async fn create(&self, actor: &Actor, input: NewProject) -> DomainResult<ProjectView> {
        if self.restrict_creation && !actor.role.can_create_project() {
            tracing::warn!(actor = %actor.id, action = "createProject", "authorization denied");
            return Err(DomainError::forbidden("Only owners can create projects"));
        }
        if input.name.trim().is_empty() {
            return Err(DomainError::validation("Project name is required"));
        }

        let mut emails: Vec<String> = input
            .members
            .iter()
            .map(|e| normalize_email(e))
            .filter(|e| !e.is_empty())
            .collect();
        emails.sort();
        emails.dedup();

        let member_ids: Vec<UserId> = if emails.is_empty() {
            Vec::new()
        } else {
            self.users
                .find_by_emails(&emails)
                .await?
                .into_iter()
                .map(|u| u.id)
                .collect()
        };

        let project = Project::new(&input.name, input.description, member_ids, actor.id)?;
        let project = self.projects.insert(project).await?;
        tracing::info!(project = %project.id, actor = %actor.id, members = project.members.len(), "project created");

        self.expand(project).await
    }

    /// Projects the user created or belongs to, newest first.
    pub async fn list_for_user(&self, user: UserId, page: PageRequest) -> DomainResult<Page<ProjectView>> {
        let total = self.projects.count_for_user(user).await?;
        let projects = self
            .projects
            .find_for_user(user, page.skip(), Some(page.limit))
            .await?;

        let lookup = UserLookup::load(
            self.users.as_ref(),
            projects.iter().flat_map(Project::participants),
        )
        .await?;

        Ok(Page::new(projects, total, page).map(|p| lookup.project(p)))
    }

    pub async fn get(&self, actor: UserId, id: ProjectId) -> DomainResult<ProjectView> {
        let project = self.guard.require(actor, id, Action::View).await?;
        self.expand(project).await
    }

    /// Owner-only. Only the provided fields change.
    pub async fn update(&self, actor: UserId, id: ProjectId, patch: ProjectPatch) -> DomainResult<ProjectView> {
        let mut project = self.guard.require(actor, id, Action::EditProject).await?;
        project.apply(patch)?;
        let project = self.projects.update(project).await?;
        self.expand(project).await
    }

    /// Owner-only. Does not cascade to tasks or comments.
    pub async fn delete(&self, actor: UserId, id: ProjectId) -> DomainResult<()> {
        self.guard.require(actor, id, Action::DeleteProject).await?;
        if !self.projects.delete(id).await? {
            return Err(DomainError::not_found("Project", id));
        }
        tracing::info!(project = %id, actor = %actor, "project deleted");
        Ok(())
    }

    /// Owner-only. Fails `NotFound` for an unknown email and `Conflict` when
    /// the user already has access.
    pub async fn add_member(&self, actor: UserId, id: ProjectId, member_email: &str) -> DomainResult<ProjectView> {
        let email = normalize_email(member_email);
        if email.is_empty() {
            return Err(DomainError::validation("memberEmail is required"));
        }

        let project = self.guard.require(actor, id, Action::AddMember).await?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| DomainError::not_found("User", &email))?;

        if project.includes(user.id) || !self.projects.add_member(id, user.id).await? {
            return Err(DomainError::Conflict(
                "User is already a member of this project".to_string(),
            ));
        }
        tracing::info!(project = %id, actor = %actor, member = %user.id, "member added");

        let project = self
            .projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Project", id))?;
        self.expand(project).await
    }

    async fn expand(&self, project: Project) -> DomainResult<ProjectView> {
        let lookup = UserLookup::load(self.users.as_ref(), project.participants()).await?;
        Ok(lookup.project(project))
    }
}
