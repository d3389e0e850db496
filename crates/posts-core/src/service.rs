//! Post authorization & mutation service.
//!
//! The caller identity handed to [`PostService::create_post`] and
//! [`PostService::delete_post`] is trusted as already authenticated by an
//! upstream gateway; this service only compares it, never verifies it.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{NewPost, Post};
use crate::error::{DomainError, RepoError};
use crate::ports::PostRepository;

/// Coordinates the post store and enforces ownership rules on deletion.
#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    /// Create a post for `owner_id`. Blank fields are rejected before any
    /// store access.
    pub async fn create_post(
        &self,
        owner_id: &str,
        title: &str,
        content: &str,
    ) -> Result<Post, DomainError> {
        if owner_id.trim().is_empty() {
            return Err(DomainError::Validation("Owner id is required".into()));
        }
        if title.trim().is_empty() {
            return Err(DomainError::Validation("Title is required".into()));
        }
        if content.trim().is_empty() {
            return Err(DomainError::Validation("Content is required".into()));
        }

        let post = self
            .repo
            .insert(NewPost::new(owner_id, title, content))
            .await?;
        Ok(post)
    }

    /// List one page of posts, newest first. All posts are visible to all
    /// callers; reads are not owner-scoped.
    pub async fn list_posts(&self, page: u64, page_size: u64) -> Result<Vec<Post>, DomainError> {
        let posts = self.repo.list(page, page_size).await?;
        Ok(posts)
    }

    /// Delete a post after an ownership check.
    ///
    /// The requester id must equal the stored owner id exactly - no
    /// trimming, no case folding. Any mismatch leaves the post untouched.
    /// A `NotFound` surfacing from the delete itself is a benign race with
    /// a concurrent owner purge and is reported as `NotFound`.
    pub async fn delete_post(&self, id: Uuid, requester_id: &str) -> Result<(), DomainError> {
        let post = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound { id })?;

        if post.owner_id != requester_id {
            return Err(DomainError::Unauthorized);
        }

        match self.repo.delete_by_id(id).await {
            Ok(()) => Ok(()),
            Err(RepoError::NotFound) => Err(DomainError::NotFound { id }),
            Err(e) => Err(DomainError::Storage(e)),
        }
    }
}
