//! # Comment Service
//!
//! Comments need only an existing task to be read or written; there is no
//! project-membership check on these paths. Changing or removing a comment
//! is reserved to its author.

use std::sync::Arc;

use domains::{
    normalize_content, Action, Comment, CommentId, CommentRepository, DomainError, DomainResult,
    NewComment, TaskId, TaskRepository, UserId, UserRepository,
};

use crate::guard::AuthorizationGuard;
use crate::views::{CommentView, UserLookup};

pub struct CommentService {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
    comments: Arc<dyn CommentRepository>,
    guard: AuthorizationGuard,
}

impl CommentService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        comments: Arc<dyn CommentRepository>,
        guard: AuthorizationGuard,
    ) -> Self {
        Self {
            users,
            tasks,
            comments,
            guard,
        }
    }

    /// Newest first, authors expanded.
    pub async fn list_for_task(&self, task_id: TaskId) -> DomainResult<Vec<CommentView>> {
        self.ensure_task(task_id).await?;
        let comments = self.comments.list_by_task(task_id).await?;
        let lookup = UserLookup::load(self.users.as_ref(), comments.iter().map(|c| c.user_id)).await?;
        Ok(comments.into_iter().map(|c| lookup.comment(c)).collect())
    }

    /// A reply's parent must exist on the same task.
    pub async fn create(&self, actor: UserId, task_id: TaskId, input: NewComment) -> DomainResult<CommentView> {
        let content = normalize_content(&input.content)?;
        self.ensure_task(task_id).await?;

        if let Some(parent_id) = input.parent_comment_id {
            match self.comments.find_by_id(parent_id).await? {
                Some(parent) if parent.task_id == task_id => {}
                _ => return Err(DomainError::not_found("Parent comment", parent_id)),
            }
        }

        let comment = Comment::new(task_id, actor, &content, input.parent_comment_id)?;
        let comment = self.comments.insert(comment).await?;
        self.expand(comment).await
    }

    /// Author-only. Marks the comment as edited.
    pub async fn update(&self, actor: UserId, id: CommentId, content: &str) -> DomainResult<CommentView> {
        let content = normalize_content(content)?;
        let mut comment = self.find(id).await?;
        self.guard.require_author(&comment, actor, Action::EditComment)?;

        comment.edit(&content)?;
        let comment = self.comments.update(comment).await?;
        self.expand(comment).await
    }

    /// Author-only. Removes the comment together with its direct replies and
    /// returns how many comments were deleted.
    pub async fn delete(&self, actor: UserId, id: CommentId) -> DomainResult<u64> {
        let comment = self.find(id).await?;
        self.guard.require_author(&comment, actor, Action::DeleteComment)?;

        let removed = self.comments.delete_with_replies(id).await?;
        tracing::info!(comment = %id, actor = %actor, removed, "comment deleted");
        Ok(removed)
    }

    async fn ensure_task(&self, task_id: TaskId) -> DomainResult<()> {
        match self.tasks.find_by_id(task_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Task", task_id)),
        }
    }

    async fn find(&self, id: CommentId) -> DomainResult<Comment> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Comment", id))
    }

    async fn expand(&self, comment: Comment) -> DomainResult<CommentView> {
        let lookup = UserLookup::load(self.users.as_ref(), [comment.user_id]).await?;
        Ok(lookup.comment(comment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipResolver;
    use domains::{MockCommentRepository, MockProjectRepository, MockTaskRepository, MockUserRepository};

    fn service(tasks: MockTaskRepository, comments: MockCommentRepository) -> CommentService {
        CommentService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(tasks),
            Arc::new(comments),
            AuthorizationGuard::new(MembershipResolver::new(Arc::new(MockProjectRepository::new()))),
        )
    }

    #[tokio::test]
    async fn non_author_cannot_delete() {
        let comment = Comment::new(TaskId::new(), UserId::new(), "mine", None).unwrap();
        let id = comment.id;

        let mut comments = MockCommentRepository::new();
        comments
            .expect_find_by_id()
            .returning(move |_| Ok(Some(comment.clone())));
        comments.expect_delete_with_replies().never();

        let err = service(MockTaskRepository::new(), comments)
            .delete(UserId::new(), id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn blank_content_is_rejected_before_lookup() {
        let svc = service(MockTaskRepository::new(), MockCommentRepository::new());
        let input = NewComment {
            content: "   ".into(),
            parent_comment_id: None,
        };
        let err = svc.create(UserId::new(), TaskId::new(), input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn missing_task_is_not_found() {
        let mut tasks = MockTaskRepository::new();
        tasks.expect_find_by_id().returning(|_| Ok(None));

        let err = service(tasks, MockCommentRepository::new())
            .list_for_task(TaskId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { resource: "Task", .. }));
    }
}
