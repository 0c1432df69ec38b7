use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use domains::{Comment, CommentId, CommentRepository, DomainError, DomainResult, TaskId, UserId};

use super::{db_error, PgStore};

const COMMENT_COLUMNS: &str = "id, task_id, user_id, content, parent_comment_id, is_edited, \
     edited_at, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    task_id: Uuid,
    user_id: Uuid,
    content: String,
    parent_comment_id: Option<Uuid>,
    is_edited: bool,
    edited_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId(row.id),
            task_id: TaskId(row.task_id),
            user_id: UserId(row.user_id),
            content: row.content,
            parent_comment_id: row.parent_comment_id.map(CommentId),
            is_edited: row.is_edited,
            edited_at: row.edited_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CommentRepository for PgStore {
    async fn insert(&self, comment: Comment) -> DomainResult<Comment> {
        sqlx::query(&format!(
            "INSERT INTO comments ({COMMENT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(comment.id.0)
        .bind(comment.task_id.0)
        .bind(comment.user_id.0)
        .bind(&comment.content)
        .bind(comment.parent_comment_id.map(|p| p.0))
        .bind(comment.is_edited)
        .bind(comment.edited_at)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(comment)
    }

    async fn find_by_id(&self, id: CommentId) -> DomainResult<Option<Comment>> {
        let row: Option<CommentRow> =
            sqlx::query_as(&format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"))
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error)?;
        Ok(row.map(Comment::from))
    }

    async fn list_by_task(&self, task: TaskId) -> DomainResult<Vec<Comment>> {
        let rows: Vec<CommentRow> = sqlx::query_as(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE task_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(task.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn update(&self, comment: Comment) -> DomainResult<Comment> {
        let row: Option<CommentRow> = sqlx::query_as(&format!(
            "UPDATE comments SET content = $2, is_edited = $3, edited_at = $4, updated_at = $5 \
             WHERE id = $1 RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(comment.id.0)
        .bind(&comment.content)
        .bind(comment.is_edited)
        .bind(comment.edited_at)
        .bind(comment.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(Comment::from)
            .ok_or_else(|| DomainError::not_found("Comment", comment.id))
    }

    async fn delete_with_replies(&self, id: CommentId) -> DomainResult<u64> {
        // One statement: the comment and its direct replies go together.
        let done = sqlx::query("DELETE FROM comments WHERE id = $1 OR parent_comment_id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(done.rows_affected())
    }
}
