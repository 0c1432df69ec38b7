//! # Task Service
//!
//! Tasks are scoped to a project; every operation is authorized against the
//! task's parent project.

use std::collections::HashSet;
use std::sync::Arc;

use domains::{
    Action, DomainError, DomainResult, NewTask, Project, ProjectId, ProjectRepository,
    ReorderEntry, Task, TaskId, TaskPatch, TaskPosition, TaskRepository, UserId, UserRepository,
};

use crate::guard::AuthorizationGuard;
use crate::views::{task_user_ids, TaskView, UserLookup};

pub struct TaskService {
    users: Arc<dyn UserRepository>,
    projects: Arc<dyn ProjectRepository>,
    tasks: Arc<dyn TaskRepository>,
    guard: AuthorizationGuard,
}

impl TaskService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        projects: Arc<dyn ProjectRepository>,
        tasks: Arc<dyn TaskRepository>,
        guard: AuthorizationGuard,
    ) -> Self {
        Self {
            users,
            projects,
            tasks,
            guard,
        }
    }

    /// Any member or the owner may create a task. New tasks go to the end of
    /// the board.
    pub async fn create(&self, actor: UserId, input: NewTask) -> DomainResult<TaskView> {
        let project = self
            .guard
            .require(actor, input.project_id, Action::CreateTask)
            .await?;
        ensure_assignable(&project, input.assignee)?;

        let existing = self.tasks.list_by_project(project.id).await?;
        let order = existing
            .iter()
            .map(|t| t.order)
            .reduce(f64::max)
            .map_or(0.0, |max| max + 1.0);

        let task = Task::create(input, actor, order)?;
        let task = self.tasks.insert(task).await?;
        tracing::info!(task = %task.id, project = %task.project_id, actor = %actor, "task created");

        self.expand_one(task).await
    }

    /// Oldest first.
    pub async fn list_by_project(&self, actor: UserId, project_id: ProjectId) -> DomainResult<Vec<TaskView>> {
        self.guard.require(actor, project_id, Action::View).await?;
        let tasks = self.tasks.list_by_project(project_id).await?;
        self.expand(tasks).await
    }

    /// Tasks across every project the user belongs to, newest first.
    pub async fn list_all_for_user(&self, actor: UserId) -> DomainResult<Vec<TaskView>> {
        let project_ids: Vec<ProjectId> = self
            .projects
            .find_for_user(actor, 0, None)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        if project_ids.is_empty() {
            return Ok(Vec::new());
        }
        let tasks = self.tasks.list_by_projects(&project_ids).await?;
        self.expand(tasks).await
    }

    pub async fn update(&self, actor: UserId, id: TaskId, patch: TaskPatch) -> DomainResult<TaskView> {
        let mut task = self.find(id).await?;
        let project = self.guard.require(actor, task.project_id, Action::EditTask).await?;
        if let Some(assignee) = patch.assignee {
            ensure_assignable(&project, assignee)?;
        }

        task.apply(patch)?;
        let task = self.tasks.update(task).await?;
        self.expand_one(task).await
    }

    pub async fn delete(&self, actor: UserId, id: TaskId) -> DomainResult<()> {
        let task = self.find(id).await?;
        self.guard.require(actor, task.project_id, Action::DeleteTask).await?;
        if !self.tasks.delete(id).await? {
            return Err(DomainError::not_found("Task", id));
        }
        tracing::info!(task = %id, project = %task.project_id, actor = %actor, "task deleted");
        Ok(())
    }

    /// Persists a board drag-and-drop. All entries must name existing tasks
    /// of one single project; the batch is written atomically.
    pub async fn reorder(&self, actor: UserId, entries: Vec<ReorderEntry>) -> DomainResult<()> {
        if entries.is_empty() {
            return Err(DomainError::validation("No tasks to reorder"));
        }
        let positions = entries
            .into_iter()
            .map(TaskPosition::try_from)
            .collect::<DomainResult<Vec<_>>>()?;

        let mut ids: Vec<TaskId> = Vec::with_capacity(positions.len());
        for position in &positions {
            if ids.contains(&position.id) {
                return Err(DomainError::validation(format!(
                    "Task {} appears more than once",
                    position.id
                )));
            }
            ids.push(position.id);
        }

        let found = self.tasks.find_by_ids(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|t| t.id == **id)) {
            return Err(DomainError::not_found("Task", missing));
        }

        let projects: HashSet<ProjectId> = found.iter().map(|t| t.project_id).collect();
        let project_id = match projects.into_iter().collect::<Vec<_>>().as_slice() {
            [single] => *single,
            _ => {
                return Err(DomainError::validation(
                    "All tasks in a reorder must belong to the same project",
                ))
            }
        };

        self.guard.require(actor, project_id, Action::ReorderTasks).await?;
        self.tasks.apply_positions(&positions).await?;
        tracing::debug!(project = %project_id, actor = %actor, count = positions.len(), "tasks reordered");
        Ok(())
    }

    async fn find(&self, id: TaskId) -> DomainResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Task", id))
    }

    async fn expand(&self, tasks: Vec<Task>) -> DomainResult<Vec<TaskView>> {
        let lookup = UserLookup::load(self.users.as_ref(), task_user_ids(&tasks)).await?;
        Ok(tasks.into_iter().map(|t| lookup.task(t)).collect())
    }

    async fn expand_one(&self, task: Task) -> DomainResult<TaskView> {
        let lookup = UserLookup::load(
            self.users.as_ref(),
            std::iter::once(task.created_by).chain(task.assignee),
        )
        .await?;
        Ok(lookup.task(task))
    }
}

/// An assignee, when set, must currently have access to the project.
fn ensure_assignable(project: &Project, assignee: Option<UserId>) -> DomainResult<()> {
    match assignee {
        Some(user) if !project.includes(user) => Err(DomainError::validation(
            "Assignee must be a member of the project",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipResolver;
    use domains::{MockProjectRepository, MockTaskRepository, MockUserRepository};

    fn task_in(project: ProjectId, creator: UserId) -> Task {
        let input = NewTask {
            project_id: project,
            title: "Task".into(),
            description: None,
            assignee: None,
            due_date: None,
            status: None,
        };
        Task::create(input, creator, 0.0).unwrap()
    }

    #[tokio::test]
    async fn reorder_across_projects_is_rejected_without_writing() {
        let user = UserId::new();
        let (a, b) = (task_in(ProjectId::new(), user), task_in(ProjectId::new(), user));
        let stored = vec![a.clone(), b.clone()];

        let mut tasks = MockTaskRepository::new();
        tasks
            .expect_find_by_ids()
            .returning(move |_| Ok(stored.clone()));
        tasks.expect_apply_positions().never();

        let projects: Arc<dyn ProjectRepository> = Arc::new(MockProjectRepository::new());
        let svc = TaskService::new(
            Arc::new(MockUserRepository::new()),
            projects.clone(),
            Arc::new(tasks),
            AuthorizationGuard::new(MembershipResolver::new(projects)),
        );

        let entries = vec![
            ReorderEntry { id: a.id, order: 2.0, status: None },
            ReorderEntry { id: b.id, order: 1.0, status: None },
        ];
        let err = svc.reorder(user, entries).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn assignee_must_have_access() {
        let (owner, member) = (UserId::new(), UserId::new());
        let project = Project::new("Board", None, vec![member], owner).unwrap();

        assert!(ensure_assignable(&project, None).is_ok());
        assert!(ensure_assignable(&project, Some(owner)).is_ok());
        assert!(ensure_assignable(&project, Some(member)).is_ok());
        assert!(ensure_assignable(&project, Some(UserId::new())).is_err());
    }
}
