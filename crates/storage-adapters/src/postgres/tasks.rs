use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use domains::{
    DomainError, DomainResult, ProjectId, Task, TaskId, TaskPosition, TaskRepository, TaskStatus,
    UserId,
};

use super::{db_error, PgStore};

const TASK_COLUMNS: &str = "id, project_id, title, description, assignee, due_date, status, \
     sort_order, created_by, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    project_id: Uuid,
    title: String,
    description: String,
    assignee: Option<Uuid>,
    due_date: Option<DateTime<Utc>>,
    status: String,
    sort_order: f64,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: TaskId(row.id),
            project_id: ProjectId(row.project_id),
            title: row.title,
            description: row.description,
            assignee: row.assignee.map(UserId),
            due_date: row.due_date,
            status: row.status.parse().unwrap_or_default(),
            order: row.sort_order,
            created_by: UserId(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TaskRepository for PgStore {
    async fn insert(&self, task: Task) -> DomainResult<Task> {
        sqlx::query(&format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"
        ))
        .bind(task.id.0)
        .bind(task.project_id.0)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assignee.map(|a| a.0))
        .bind(task.due_date)
        .bind(task.status.as_str())
        .bind(task.order)
        .bind(task.created_by.0)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(task)
    }

    async fn find_by_id(&self, id: TaskId) -> DomainResult<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(row.map(Task::from))
    }

    async fn find_by_ids(&self, ids: &[TaskId]) -> DomainResult<Vec<Task>> {
        let ids: Vec<Uuid> = ids.iter().map(|id| id.0).collect();
        let rows: Vec<TaskRow> = sqlx::query_as(&format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn list_by_project(&self, project: ProjectId) -> DomainResult<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(project.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn list_by_projects(&self, projects: &[ProjectId]) -> DomainResult<Vec<Task>> {
        let ids: Vec<Uuid> = projects.iter().map(|id| id.0).collect();
        let rows: Vec<TaskRow> = sqlx::query_as(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE project_id = ANY($1) ORDER BY created_at DESC, id DESC"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn update(&self, task: Task) -> DomainResult<Task> {
        // project_id is immutable.
        let row: Option<TaskRow> = sqlx::query_as(&format!(
            "UPDATE tasks SET title = $2, description = $3, assignee = $4, due_date = $5, \
             status = $6, sort_order = $7, updated_at = $8 WHERE id = $1 RETURNING {TASK_COLUMNS}"
        ))
        .bind(task.id.0)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assignee.map(|a| a.0))
        .bind(task.due_date)
        .bind(task.status.as_str())
        .bind(task.order)
        .bind(task.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Task::from)
            .ok_or_else(|| DomainError::not_found("Task", task.id))
    }

    async fn delete(&self, id: TaskId) -> DomainResult<bool> {
        let done = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(done.rows_affected() > 0)
    }

    async fn apply_positions(&self, positions: &[TaskPosition]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        for position in positions {
            let done = sqlx::query(
                "UPDATE tasks SET sort_order = $2, status = COALESCE($3, status), updated_at = now() \
                 WHERE id = $1",
            )
            .bind(position.id.0)
            .bind(position.order)
            .bind(position.status.map(TaskStatus::as_str))
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

            if done.rows_affected() == 0 {
                tx.rollback().await.map_err(db_error)?;
                return Err(DomainError::not_found("Task", position.id));
            }
        }

        tx.commit().await.map_err(db_error)?;
        Ok(())
    }
}
