use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use domains::{DomainError, DomainResult, Project, ProjectId, ProjectRepository, UserId};

use super::{db_error, to_i64, PgStore};

const VISIBLE_TO_USER: &str = "p.created_by = $1 OR EXISTS \
     (SELECT 1 FROM project_members m WHERE m.project_id = p.id AND m.user_id = $1)";

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: Uuid,
    name: String,
    description: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProjectRow {
    fn into_project(self, members: Vec<UserId>) -> Project {
        Project {
            id: ProjectId(self.id),
            name: self.name,
            description: self.description,
            members,
            created_by: UserId(self.created_by),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl PgStore {
    /// Attaches member lists, in the order members were added.
    async fn with_members(&self, rows: Vec<ProjectRow>) -> DomainResult<Vec<Project>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let pairs: Vec<(Uuid, Uuid)> = sqlx::query_as(
            "SELECT project_id, user_id FROM project_members \
             WHERE project_id = ANY($1) ORDER BY added_at ASC, user_id ASC",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut members: HashMap<Uuid, Vec<UserId>> = HashMap::new();
        for (project_id, user_id) in pairs {
            members.entry(project_id).or_default().push(UserId(user_id));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let list = members.remove(&row.id).unwrap_or_default();
                row.into_project(list)
            })
            .collect())
    }
}

#[async_trait]
impl ProjectRepository for PgStore {
    async fn insert(&self, project: Project) -> DomainResult<Project> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query(
            "INSERT INTO projects (id, name, description, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.created_by.0)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        for member in &project.members {
            sqlx::query(
                "INSERT INTO project_members (project_id, user_id, added_at) \
                 VALUES ($1, $2, clock_timestamp()) ON CONFLICT DO NOTHING",
            )
            .bind(project.id.0)
            .bind(member.0)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(project)
    }

    async fn find_by_id(&self, id: ProjectId) -> DomainResult<Option<Project>> {
        let row: Option<ProjectRow> = sqlx::query_as(
            "SELECT id, name, description, created_by, created_at, updated_at FROM projects WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        match row {
            Some(row) => Ok(self.with_members(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_for_user(&self, user: UserId, skip: u64, limit: Option<u64>) -> DomainResult<Vec<Project>> {
        let rows: Vec<ProjectRow> = sqlx::query_as(&format!(
            "SELECT p.id, p.name, p.description, p.created_by, p.created_at, p.updated_at \
             FROM projects p WHERE {VISIBLE_TO_USER} \
             ORDER BY p.created_at DESC, p.id DESC OFFSET $2 LIMIT $3"
        ))
        .bind(user.0)
        .bind(to_i64(skip))
        .bind(limit.map(to_i64))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        self.with_members(rows).await
    }

    async fn count_for_user(&self, user: UserId) -> DomainResult<u64> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM projects p WHERE {VISIBLE_TO_USER}"
        ))
        .bind(user.0)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(u64::try_from(total).unwrap_or_default())
    }

    async fn update(&self, project: Project) -> DomainResult<Project> {
        let done = sqlx::query(
            "UPDATE projects SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(project.id.0)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if done.rows_affected() == 0 {
            return Err(DomainError::not_found("Project", project.id));
        }
        Ok(project)
    }

    async fn add_member(&self, id: ProjectId, user: UserId) -> DomainResult<bool> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let inserted = sqlx::query(
            "INSERT INTO project_members (project_id, user_id, added_at) \
             SELECT id, $2, clock_timestamp() FROM projects WHERE id = $1 \
             ON CONFLICT DO NOTHING",
        )
        .bind(id.0)
        .bind(user.0)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?
        .rows_affected();

        if inserted > 0 {
            sqlx::query("UPDATE projects SET updated_at = now() WHERE id = $1")
                .bind(id.0)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;
        }

        tx.commit().await.map_err(db_error)?;
        Ok(inserted > 0)
    }

    async fn delete(&self, id: ProjectId) -> DomainResult<bool> {
        let done = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(done.rows_affected() > 0)
    }
}
