use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CommentId, TaskId, UserId};
use crate::errors::{DomainError, DomainResult};

pub const MAX_COMMENT_LEN: usize = 2000;

/// A remark on a task. Replies point at their parent through
/// `parent_comment_id`; deleting a comment removes its direct replies only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub task_id: TaskId,
    /// Author. Only the author may edit or delete.
    pub user_id: UserId,
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
    #[serde(default)]
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        task_id: TaskId,
        author: UserId,
        content: &str,
        parent_comment_id: Option<CommentId>,
    ) -> DomainResult<Self> {
        let content = normalize_content(content)?;
        let now = Utc::now();
        Ok(Self {
            id: CommentId::new(),
            task_id,
            user_id: author,
            content,
            parent_comment_id,
            is_edited: false,
            edited_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn edit(&mut self, content: &str) -> DomainResult<()> {
        self.content = normalize_content(content)?;
        let now = Utc::now();
        self.is_edited = true;
        self.edited_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

/// Trims and bounds comment text.
pub fn normalize_content(raw: &str) -> DomainResult<String> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(DomainError::validation("Comment content is required"));
    }
    if content.chars().count() > MAX_COMMENT_LEN {
        return Err(DomainError::validation(format!(
            "Comment cannot exceed {MAX_COMMENT_LEN} characters"
        )));
    }
    Ok(content.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    #[serde(default)]
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
}
