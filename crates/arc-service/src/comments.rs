//! Comment service: validation in front of
//! [`arc_storage::CommentRepository`].

use std::sync::Arc;

use arc_core::inputs::{self, NewComment};
use arc_core::{Comment, CommentId, CommentType, IssueId, Result};
use arc_storage::{CommentRepository, StorageEngine};

/// Validated comment CRUD.
pub struct CommentService {
    repo: CommentRepository,
}

impl CommentService {
    /// Build a service over the given storage engine.
    pub fn new(engine: Arc<StorageEngine>) -> Self {
        Self {
            repo: CommentRepository::new(engine),
        }
    }

    /// Add a comment, rejecting empty text. Defaults to
    /// [`CommentType::Comment`] when the caller doesn't specify a type.
    pub async fn add(&self, issue_id: &IssueId, input: NewComment, actor: &str) -> Result<Comment> {
        inputs::validate_comment_text(&input.text)?;
        let comment_type = input.comment_type.unwrap_or(CommentType::Comment);
        self.repo.add(issue_id, input.text, comment_type, actor).await
    }

    /// List comments of a given type on an issue, in the type's canonical
    /// order.
    pub async fn list(&self, issue_id: &IssueId, comment_type: CommentType) -> Result<Vec<Comment>> {
        self.repo.list_for_issue(issue_id, comment_type).await
    }

    /// Fetch a single comment by id.
    pub async fn get(&self, id: CommentId) -> Result<Comment> {
        self.repo.get(id).await
    }

    /// Edit a comment's text, rejecting empty text.
    pub async fn update(&self, id: CommentId, text: String) -> Result<Comment> {
        inputs::validate_comment_text(&text)?;
        self.repo.update(id, text).await
    }

    /// Delete a comment.
    pub async fn delete(&self, id: CommentId) -> Result<()> {
        self.repo.delete(id).await
    }
}
