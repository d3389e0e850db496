//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a post. The owner identity is not part of the body;
/// it arrives in the `X-User-Id` header set by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// Externally visible shape of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Query parameters for listing posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
}
