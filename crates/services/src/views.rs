//! Read models returned to clients: stored records with user references
//! expanded to `{id, name, email}`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use domains::{
    Comment, CommentId, DomainResult, Project, ProjectId, Task, TaskId, TaskStatus, UserId,
    UserRepository, UserSummary,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub members: Vec<UserSummary>,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: TaskId,
    pub project_id: ProjectId,
    pub title: String,
    pub description: String,
    pub assignee: Option<UserSummary>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub order: f64,
    pub created_by: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub task_id: TaskId,
    #[serde(rename = "userId")]
    pub author: Option<UserSummary>,
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
    pub is_edited: bool,
    pub edited_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Batch-loaded user summaries. Ids that no longer resolve are skipped.
pub(crate) struct UserLookup(HashMap<UserId, UserSummary>);

impl UserLookup {
    pub(crate) async fn load(
        users: &dyn UserRepository,
        ids: impl IntoIterator<Item = UserId>,
    ) -> DomainResult<Self> {
        let mut wanted: Vec<UserId> = ids.into_iter().collect();
        wanted.sort();
        wanted.dedup();
        if wanted.is_empty() {
            return Ok(Self(HashMap::new()));
        }
        let found = users.find_by_ids(&wanted).await?;
        Ok(Self(found.iter().map(|u| (u.id, u.summary())).collect()))
    }

    pub(crate) fn get(&self, id: UserId) -> Option<UserSummary> {
        self.0.get(&id).cloned()
    }

    pub(crate) fn project(&self, project: Project) -> ProjectView {
        let members = project
            .participants()
            .into_iter()
            .filter_map(|id| self.get(id))
            .collect();
        ProjectView {
            id: project.id,
            name: project.name,
            description: project.description,
            members,
            created_by: self.get(project.created_by),
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }

    pub(crate) fn task(&self, task: Task) -> TaskView {
        TaskView {
            id: task.id,
            project_id: task.project_id,
            title: task.title,
            description: task.description,
            assignee: task.assignee.and_then(|id| self.get(id)),
            due_date: task.due_date,
            status: task.status,
            order: task.order,
            created_by: self.get(task.created_by),
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }

    pub(crate) fn comment(&self, comment: Comment) -> CommentView {
        CommentView {
            id: comment.id,
            task_id: comment.task_id,
            author: self.get(comment.user_id),
            content: comment.content,
            parent_comment_id: comment.parent_comment_id,
            is_edited: comment.is_edited,
            edited_at: comment.edited_at,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

pub(crate) fn task_user_ids(tasks: &[Task]) -> impl Iterator<Item = UserId> + '_ {
    tasks
        .iter()
        .flat_map(|t| std::iter::once(t.created_by).chain(t.assignee))
}
