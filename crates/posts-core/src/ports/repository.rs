use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewPost, Post};
use crate::error::RepoError;

/// Post store port.
///
/// The store owns id and timestamp assignment: `insert` takes a [`NewPost`]
/// and returns the persisted record with a fresh, never-reused id and a
/// `created_at` that is monotonically non-decreasing across inserts.
/// Each operation is individually atomic; no multi-operation transaction is
/// exposed through this port.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post, assigning id and creation timestamp.
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError>;

    /// Find a post by its unique id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// List one page of posts, newest first (`created_at` descending, ties
    /// broken by insertion order). Page bounds are validated by the caller.
    async fn list(&self, page: u64, page_size: u64) -> Result<Vec<Post>, RepoError>;

    /// Delete exactly one post. `RepoError::NotFound` if the id is absent.
    async fn delete_by_id(&self, id: Uuid) -> Result<(), RepoError>;

    /// Delete every post owned by `owner_id`, returning how many were
    /// removed. Safe to call repeatedly: a second call finds nothing and
    /// returns 0. Never touches posts of other owners.
    async fn delete_by_owner(&self, owner_id: &str) -> Result<u64, RepoError>;
}
