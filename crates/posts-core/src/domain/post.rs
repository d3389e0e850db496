use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a user-authored post.
///
/// Immutable after creation: there is no update operation, deletion is the
/// only other lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Identity string of the creating user, asserted by the upstream
    /// gateway. Fixed for the lifetime of the post.
    pub owner_id: String,
    pub title: String,
    pub content: String,
    /// Assigned by the store at insertion; sole sort key for listing.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a post. `id` and `created_at` are store-assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub owner_id: String,
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn new(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            title: title.into(),
            content: content.into(),
        }
    }
}
