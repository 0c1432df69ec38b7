//! # Ports
//!
//! Any adapter must implement these traits to be wired into the services.
//! Repositories are per aggregate; each method maps onto one store
//! primitive (find by id, find by field, windowed find, count, insert,
//! update, delete, batch update).

use async_trait::async_trait;

use crate::errors::DomainResult;
use crate::models::{
    Comment, CommentId, GlobalRole, Project, ProjectId, Task, TaskId, TaskPosition, User, UserId,
};

/// Persistence contract for user accounts.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the (lowercased) email is taken.
    async fn insert(&self, user: User) -> DomainResult<User>;
    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    /// Unknown emails are simply absent from the result.
    async fn find_by_emails(&self, emails: &[String]) -> DomainResult<Vec<User>>;
    async fn find_by_ids(&self, ids: &[UserId]) -> DomainResult<Vec<User>>;
    /// Sorted by name.
    async fn list_by_role(&self, role: GlobalRole) -> DomainResult<Vec<User>>;
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: UserId) -> DomainResult<bool>;
}

/// Persistence contract for projects and their member sets.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert(&self, project: Project) -> DomainResult<Project>;
    async fn find_by_id(&self, id: ProjectId) -> DomainResult<Option<Project>>;
    /// Projects the user created or belongs to, newest first. `limit: None`
    /// returns everything after `skip`.
    async fn find_for_user(
        &self,
        user: UserId,
        skip: u64,
        limit: Option<u64>,
    ) -> DomainResult<Vec<Project>>;
    async fn count_for_user(&self, user: UserId) -> DomainResult<u64>;
    /// Persists name and description. Last write wins.
    async fn update(&self, project: Project) -> DomainResult<Project>;
    /// Appends a member. Returns `false` when the user was already listed.
    async fn add_member(&self, id: ProjectId, user: UserId) -> DomainResult<bool>;
    /// Removes the project document only; tasks and comments are untouched.
    async fn delete(&self, id: ProjectId) -> DomainResult<bool>;
}

/// Persistence contract for tasks.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: Task) -> DomainResult<Task>;
    async fn find_by_id(&self, id: TaskId) -> DomainResult<Option<Task>>;
    async fn find_by_ids(&self, ids: &[TaskId]) -> DomainResult<Vec<Task>>;
    /// Oldest first.
    async fn list_by_project(&self, project: ProjectId) -> DomainResult<Vec<Task>>;
    /// Newest first.
    async fn list_by_projects(&self, projects: &[ProjectId]) -> DomainResult<Vec<Task>>;
    async fn update(&self, task: Task) -> DomainResult<Task>;
    async fn delete(&self, id: TaskId) -> DomainResult<bool>;
    /// Writes every position or none of them.
    async fn apply_positions(&self, positions: &[TaskPosition]) -> DomainResult<()>;
}

/// Persistence contract for task comments.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: Comment) -> DomainResult<Comment>;
    async fn find_by_id(&self, id: CommentId) -> DomainResult<Option<Comment>>;
    /// Newest first.
    async fn list_by_task(&self, task: TaskId) -> DomainResult<Vec<Comment>>;
    async fn update(&self, comment: Comment) -> DomainResult<Comment>;
    /// Deletes the comment and every comment whose parent it is, in one
    /// operation. Returns the number of removed comments.
    async fn delete_with_replies(&self, id: CommentId) -> DomainResult<u64>;
}

/// One-way password hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> DomainResult<String>;
    async fn verify(&self, password: &str, hash: &str) -> DomainResult<bool>;
}

/// What a verified credential proves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialClaims {
    pub user_id: UserId,
    pub email: String,
}

/// Signed-credential issuance and verification.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait CredentialService: Send + Sync {
    fn issue(&self, user_id: UserId, email: &str) -> DomainResult<String>;
    /// Fails with `Unauthorized` for malformed, tampered or expired tokens.
    fn verify(&self, token: &str) -> DomainResult<CredentialClaims>;
}
