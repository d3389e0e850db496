//! User-deletion event consumer.
//!
//! Another service owns user accounts; when one is deleted it emits an
//! event whose payload is the bare user-id string. Deliveries are
//! at-least-once and unordered, so the handler is a plain idempotent
//! command: purge the user's posts. A redelivered event finds nothing left
//! and removes zero rows. A store failure nacks the delivery so the
//! transport redelivers it instead of losing it.

use std::sync::Arc;

use posts_core::ports::{Delivery, EventBus, PostRepository};

/// Subscribe the purge handler on the given channel.
pub async fn subscribe_user_deleted<B: EventBus>(
    bus: &B,
    posts: Arc<dyn PostRepository>,
    channel: &str,
) -> Result<(), posts_core::ports::EventError> {
    bus.subscribe(channel, move |msg| {
        let posts = posts.clone();
        Box::pin(async move {
            tracing::info!(user_id = %msg.payload, "Received user-deletion event");

            match posts.delete_by_owner(&msg.payload).await {
                Ok(count) => {
                    tracing::info!(
                        user_id = %msg.payload,
                        deleted = count,
                        "Removed posts for deleted user"
                    );
                    Delivery::Ack
                }
                Err(e) => {
                    tracing::error!(
                        user_id = %msg.payload,
                        error = %e,
                        "Failed to remove posts, requesting redelivery"
                    );
                    Delivery::Requeue(e.to_string())
                }
            }
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use posts_core::domain::NewPost;
    use posts_infra::InMemoryPostRepository;
    use posts_infra::events::{InMemoryEventQueue, InMemoryEventQueueConfig};

    fn queue() -> InMemoryEventQueue {
        InMemoryEventQueue::new(InMemoryEventQueueConfig {
            buffer_size: 16,
            max_redeliveries: 5,
            redelivery_delay_ms: 5,
        })
    }

    async fn seed_store(repo: &dyn PostRepository, owner: &str, count: usize) {
        for i in 0..count {
            repo.insert(NewPost::new(owner, format!("{owner} {i}"), "content"))
                .await
                .unwrap();
        }
    }

    /// Poll until the condition holds or the deadline passes.
    async fn wait_until<F, Fut>(mut condition: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        for _ in 0..100 {
            if condition().await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("condition not reached in time");
    }

    #[tokio::test]
    async fn purges_only_the_deleted_users_posts() {
        let repo = Arc::new(InMemoryPostRepository::new());
        seed_store(repo.as_ref(), "carol", 3).await;
        seed_store(repo.as_ref(), "dave", 2).await;

        let bus = queue();
        subscribe_user_deleted(&bus, repo.clone(), "user.deleted")
            .await
            .unwrap();

        bus.publish("user.deleted", "carol").await.unwrap();

        let repo_check = repo.clone();
        wait_until(move || {
            let repo = repo_check.clone();
            async move { repo.list(0, 100).await.unwrap().len() == 2 }
        })
        .await;

        let remaining = repo.list(0, 100).await.unwrap();
        assert!(remaining.iter().all(|p| p.owner_id == "dave"));
    }

    #[tokio::test]
    async fn duplicate_delivery_is_a_noop() {
        let repo = Arc::new(InMemoryPostRepository::new());
        seed_store(repo.as_ref(), "carol", 3).await;
        seed_store(repo.as_ref(), "dave", 2).await;

        let bus = queue();
        subscribe_user_deleted(&bus, repo.clone(), "user.deleted")
            .await
            .unwrap();

        bus.publish("user.deleted", "carol").await.unwrap();
        bus.publish("user.deleted", "carol").await.unwrap();

        let repo_check = repo.clone();
        wait_until(move || {
            let repo = repo_check.clone();
            async move { repo.list(0, 100).await.unwrap().len() == 2 }
        })
        .await;

        // Give the second delivery time to land; it must not remove more.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let remaining = repo.list(0, 100).await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|p| p.owner_id == "dave"));
    }

    #[tokio::test]
    async fn store_failure_nacks_and_the_purge_lands_on_redelivery() {
        use std::sync::atomic::{AtomicU32, Ordering};

        use async_trait::async_trait;
        use posts_core::domain::{NewPost, Post};
        use posts_core::error::RepoError;

        /// Store wrapper that fails the first deletions, then recovers.
        struct FlakyStore {
            inner: InMemoryPostRepository,
            failures_left: AtomicU32,
        }

        #[async_trait]
        impl PostRepository for FlakyStore {
            async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
                self.inner.insert(new_post).await
            }

            async fn find_by_id(&self, id: uuid::Uuid) -> Result<Option<Post>, RepoError> {
                self.inner.find_by_id(id).await
            }

            async fn list(&self, page: u64, page_size: u64) -> Result<Vec<Post>, RepoError> {
                self.inner.list(page, page_size).await
            }

            async fn delete_by_id(&self, id: uuid::Uuid) -> Result<(), RepoError> {
                self.inner.delete_by_id(id).await
            }

            async fn delete_by_owner(&self, owner_id: &str) -> Result<u64, RepoError> {
                if self.failures_left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    n.checked_sub(1)
                })
                .is_ok()
                {
                    return Err(RepoError::Connection("store unavailable".to_string()));
                }
                self.inner.delete_by_owner(owner_id).await
            }
        }

        let repo = Arc::new(FlakyStore {
            inner: InMemoryPostRepository::new(),
            failures_left: AtomicU32::new(2),
        });
        seed_store(repo.as_ref(), "carol", 2).await;

        let bus = queue();
        subscribe_user_deleted(&bus, repo.clone(), "user.deleted")
            .await
            .unwrap();

        bus.publish("user.deleted", "carol").await.unwrap();

        let repo_check = repo.clone();
        wait_until(move || {
            let repo = repo_check.clone();
            async move { repo.list(0, 100).await.unwrap().is_empty() }
        })
        .await;
    }

    #[tokio::test]
    async fn event_for_user_without_posts_is_tolerated() {
        let repo = Arc::new(InMemoryPostRepository::new());
        seed_store(repo.as_ref(), "dave", 1).await;

        let bus = queue();
        subscribe_user_deleted(&bus, repo.clone(), "user.deleted")
            .await
            .unwrap();

        bus.publish("user.deleted", "nobody").await.unwrap();
        // Consumer keeps running; dave's post survives.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(repo.list(0, 100).await.unwrap().len(), 1);
    }
}
