//! In-memory post store - used as fallback when the database is unavailable.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use posts_core::domain::{NewPost, Post};
use posts_core::error::RepoError;
use posts_core::ports::PostRepository;

struct StoredPost {
    /// Insertion sequence, used to break `created_at` ties.
    seq: u64,
    post: Post,
}

struct Store {
    posts: Vec<StoredPost>,
    next_seq: u64,
    last_created_at: DateTime<Utc>,
}

/// In-memory post store using a single async RwLock.
///
/// The write lock serializes id and timestamp assignment, so concurrent
/// inserts never share an id and `created_at` never decreases.
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    store: RwLock<Store>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                posts: Vec::new(),
                next_seq: 0,
                last_created_at: DateTime::<Utc>::MIN_UTC,
            }),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut store = self.store.write().await;

        // Clamp against the last assigned timestamp so the listing sort key
        // never goes backwards even if the wall clock does.
        let created_at = Utc::now().max(store.last_created_at);
        store.last_created_at = created_at;

        let seq = store.next_seq;
        store.next_seq += 1;

        let post = Post {
            id: Uuid::new_v4(),
            owner_id: new_post.owner_id,
            title: new_post.title,
            content: new_post.content,
            created_at,
        };

        store.posts.push(StoredPost {
            seq,
            post: post.clone(),
        });

        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let store = self.store.read().await;
        Ok(store
            .posts
            .iter()
            .find(|s| s.post.id == id)
            .map(|s| s.post.clone()))
    }

    async fn list(&self, page: u64, page_size: u64) -> Result<Vec<Post>, RepoError> {
        let store = self.store.read().await;

        let mut ordered: Vec<&StoredPost> = store.posts.iter().collect();
        // Newest first; equal timestamps fall back to insertion order,
        // latest insert first.
        ordered.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(ordered
            .into_iter()
            .skip((page.saturating_mul(page_size)) as usize)
            .take(page_size as usize)
            .map(|s| s.post.clone())
            .collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), RepoError> {
        let mut store = self.store.write().await;
        let before = store.posts.len();
        store.posts.retain(|s| s.post.id != id);

        if store.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn delete_by_owner(&self, owner_id: &str) -> Result<u64, RepoError> {
        let mut store = self.store.write().await;
        let before = store.posts.len();
        store.posts.retain(|s| s.post.owner_id != owner_id);
        let removed = (before - store.posts.len()) as u64;

        Ok(removed)
    }
}
