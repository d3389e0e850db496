//! PostgreSQL post store implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use posts_core::domain::{NewPost, Post};
use posts_core::error::RepoError;
use posts_core::ports::PostRepository;

use super::entity::post::{self, Entity as PostEntity};

/// PostgreSQL post store.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn map_err(e: sea_orm::DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint(err_str)
    } else {
        RepoError::Query(err_str)
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(new_post.owner_id),
            title: Set(new_post.title),
            content: Set(new_post.content),
            created_at: Set(Utc::now().into()),
        };

        let saved = model.insert(&self.db).await.map_err(map_err)?;
        Ok(saved.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self, page: u64, page_size: u64) -> Result<Vec<Post>, RepoError> {
        // Secondary key keeps pages deterministic when timestamps collide.
        let result = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(&self.db, page_size)
            .fetch_page(page)
            .await
            .map_err(map_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(map_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn delete_by_owner(&self, owner_id: &str) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .filter(post::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await
            .map_err(map_err)?;

        Ok(result.rows_affected)
    }
}
