use super::posts::load_post;
use crate::domain::{Identity, Post};
use crate::infrastructure::db::{CommentRepository, PostRepository};
use clipsesh_errors::AppError;
use uuid::Uuid;

const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Clone)]
pub struct CommentThread {
    posts: PostRepository,
    comments: CommentRepository,
}

impl CommentThread {
    pub fn new(posts: PostRepository, comments: CommentRepository) -> Self {
        Self { posts, comments }
    }

    pub async fn add(&self, post_id: Uuid, author: &Identity, text: &str) -> Result<Post, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Comment must not be empty".to_string()));
        }
        if text.chars().count() > MAX_COMMENT_LENGTH {
            return Err(AppError::Validation(format!(
                "Comment must be at most {MAX_COMMENT_LENGTH} characters"
            )));
        }

        self.posts
            .find_by_id(post_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Post"))?;

        self.comments
            .append(post_id, &author.username, text)
            .await
            .map_err(AppError::internal)?;

        load_post(&self.posts, &self.comments, post_id).await
    }

    /// Only the author or an admin may remove a comment.
    pub async fn remove(
        &self,
        post_id: Uuid,
        comment_id: i32,
        requester: &Identity,
    ) -> Result<Post, AppError> {
        self.posts
            .find_by_id(post_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Post"))?;

        let comment = self
            .comments
            .find(post_id, comment_id)
            .await
            .map_err(AppError::internal)?
            .ok_or_else(|| AppError::not_found("Comment"))?;

        if comment.username != requester.username && !requester.is_admin() {
            return Err(AppError::Forbidden(
                "You can only delete your own comments".to_string(),
            ));
        }

        self.comments
            .delete(comment.id)
            .await
            .map_err(AppError::internal)?;

        load_post(&self.posts, &self.comments, post_id).await
    }
}
