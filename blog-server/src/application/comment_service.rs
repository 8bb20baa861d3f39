use std::sync::Arc;

use crate::data::comment_repository::CommentRepository;
use crate::domain::{comment::Comment, error::DomainError, post::Post};
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct CommentService {
    repo: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(repo: Arc<dyn CommentRepository>) -> Self {
        Self { repo }
    }

    pub async fn active_comments(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        self.repo.active_for_post(post_id).await
    }

    #[instrument(skip(self, post, email, body), fields(post_id = %post.id))]
    pub async fn add_comment(
        &self,
        post: &Post,
        name: String,
        email: String,
        body: String,
    ) -> Result<Comment, DomainError> {
        let comment = Comment::new(post.id, name, email, body);
        self.repo.create(comment).await
    }
}
