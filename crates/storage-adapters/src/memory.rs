//! # In-memory store
//!
//! Concurrent maps keyed by id. Multi-record writes (the board reorder batch
//! and the comment cascade) hold `batch` exclusively, and readers of the
//! affected collections hold it shared, so a half-applied batch is never
//! visible.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::cmp::Reverse;
use tokio::sync::RwLock;

use domains::{
    Comment, CommentId, CommentRepository, DomainError, DomainResult, GlobalRole, Project,
    ProjectId, ProjectRepository, Task, TaskId, TaskPosition, TaskRepository, User, UserId,
    UserRepository,
};

#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<UserId, User>,
    /// Lowercased email → owner, doubles as the unique index.
    emails: DashMap<String, UserId>,
    projects: DashMap<ProjectId, Project>,
    tasks: DashMap<TaskId, Task>,
    comments: DashMap<CommentId, Comment>,
    batch: RwLock<()>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: User) -> DomainResult<User> {
        match self.emails.entry(user.email.clone()) {
            Entry::Occupied(_) => return Err(DomainError::Conflict("Email already registered".into())),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
            }
        }
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let Some(id) = self.emails.get(email).map(|e| *e.value()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_emails(&self, emails: &[String]) -> DomainResult<Vec<User>> {
        Ok(emails
            .iter()
            .filter_map(|email| self.emails.get(email).map(|e| *e.value()))
            .filter_map(|id| self.users.get(&id).map(|u| u.clone()))
            .collect())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> DomainResult<Vec<User>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|u| u.clone()))
            .collect())
    }

    async fn list_by_role(&self, role: GlobalRole) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|u| u.role == role)
            .map(|u| u.value().clone())
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn delete(&self, id: UserId) -> DomainResult<bool> {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.emails.remove(&user.email);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ProjectRepository for MemoryStore {
    async fn insert(&self, project: Project) -> DomainResult<Project> {
        self.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn find_by_id(&self, id: ProjectId) -> DomainResult<Option<Project>> {
        Ok(self.projects.get(&id).map(|p| p.clone()))
    }

    async fn find_for_user(&self, user: UserId, skip: u64, limit: Option<u64>) -> DomainResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.includes(user))
            .map(|p| p.value().clone())
            .collect();
        projects.sort_by_key(|p| Reverse((p.created_at, p.id)));

        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(projects.into_iter().skip(skip).take(limit).collect())
    }

    async fn count_for_user(&self, user: UserId) -> DomainResult<u64> {
        Ok(self.projects.iter().filter(|p| p.includes(user)).count() as u64)
    }

    async fn update(&self, project: Project) -> DomainResult<Project> {
        let mut stored = self
            .projects
            .get_mut(&project.id)
            .ok_or_else(|| DomainError::not_found("Project", project.id))?;
        stored.name = project.name;
        stored.description = project.description;
        stored.updated_at = project.updated_at;
        Ok(stored.clone())
    }

    async fn add_member(&self, id: ProjectId, user: UserId) -> DomainResult<bool> {
        let mut stored = self
            .projects
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Project", id))?;
        Ok(stored.add_member(user))
    }

    async fn delete(&self, id: ProjectId) -> DomainResult<bool> {
        Ok(self.projects.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn insert(&self, task: Task) -> DomainResult<Task> {
        let _gate = self.batch.read().await;
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> DomainResult<Option<Task>> {
        let _gate = self.batch.read().await;
        Ok(self.tasks.get(&id).map(|t| t.clone()))
    }

    async fn find_by_ids(&self, ids: &[TaskId]) -> DomainResult<Vec<Task>> {
        let _gate = self.batch.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| self.tasks.get(id).map(|t| t.clone()))
            .collect())
    }

    async fn list_by_project(&self, project: ProjectId) -> DomainResult<Vec<Task>> {
        let _gate = self.batch.read().await;
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.project_id == project)
            .map(|t| t.value().clone())
            .collect();
        tasks.sort_by_key(|t| (t.created_at, t.id));
        Ok(tasks)
    }

    async fn list_by_projects(&self, projects: &[ProjectId]) -> DomainResult<Vec<Task>> {
        let _gate = self.batch.read().await;
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| projects.contains(&t.project_id))
            .map(|t| t.value().clone())
            .collect();
        tasks.sort_by_key(|t| Reverse((t.created_at, t.id)));
        Ok(tasks)
    }

    async fn update(&self, task: Task) -> DomainResult<Task> {
        let _gate = self.batch.read().await;
        let mut stored = self
            .tasks
            .get_mut(&task.id)
            .ok_or_else(|| DomainError::not_found("Task", task.id))?;
        let project_id = stored.project_id;
        *stored = Task { project_id, ..task };
        Ok(stored.clone())
    }

    async fn delete(&self, id: TaskId) -> DomainResult<bool> {
        let _gate = self.batch.read().await;
        Ok(self.tasks.remove(&id).is_some())
    }

    async fn apply_positions(&self, positions: &[TaskPosition]) -> DomainResult<()> {
        let _gate = self.batch.write().await;
        if let Some(missing) = positions.iter().find(|p| !self.tasks.contains_key(&p.id)) {
            return Err(DomainError::not_found("Task", missing.id));
        }
        let now = chrono::Utc::now();
        for position in positions {
            if let Some(mut task) = self.tasks.get_mut(&position.id) {
                task.order = position.order;
                if let Some(status) = position.status {
                    task.status = status;
                }
                task.updated_at = now;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn insert(&self, comment: Comment) -> DomainResult<Comment> {
        let _gate = self.batch.read().await;
        self.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: CommentId) -> DomainResult<Option<Comment>> {
        let _gate = self.batch.read().await;
        Ok(self.comments.get(&id).map(|c| c.clone()))
    }

    async fn list_by_task(&self, task: TaskId) -> DomainResult<Vec<Comment>> {
        let _gate = self.batch.read().await;
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.task_id == task)
            .map(|c| c.value().clone())
            .collect();
        comments.sort_by_key(|c| Reverse((c.created_at, c.id)));
        Ok(comments)
    }

    async fn update(&self, comment: Comment) -> DomainResult<Comment> {
        let _gate = self.batch.read().await;
        let mut stored = self
            .comments
            .get_mut(&comment.id)
            .ok_or_else(|| DomainError::not_found("Comment", comment.id))?;
        stored.content = comment.content;
        stored.is_edited = comment.is_edited;
        stored.edited_at = comment.edited_at;
        stored.updated_at = comment.updated_at;
        Ok(stored.clone())
    }

    async fn delete_with_replies(&self, id: CommentId) -> DomainResult<u64> {
        let _gate = self.batch.write().await;
        let before = self.comments.len();
        self.comments
            .retain(|cid, c| *cid != id && c.parent_comment_id != Some(id));
        Ok((before - self.comments.len()) as u64)
    }
}
