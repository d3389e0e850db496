//! Application state - shared across all handlers.

use std::sync::Arc;

use posts_core::PostService;
use posts_core::ports::PostRepository;
use posts_infra::InMemoryPostRepository;

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use posts_infra::PostgresPostRepository;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: PostService,
    pub posts: Arc<dyn PostRepository>,
}

impl AppState {
    /// Build the application state with the appropriate store backend.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        let posts: Arc<dyn PostRepository> = {
            if let Some(db_config) = &config.database {
                match posts_infra::database::connect(db_config).await {
                    Ok(conn) => Arc::new(PostgresPostRepository::new(conn)),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Arc::new(InMemoryPostRepository::new())
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Arc::new(InMemoryPostRepository::new())
            }
        };

        #[cfg(not(feature = "postgres"))]
        let posts: Arc<dyn PostRepository> = {
            let _ = config;
            tracing::info!("Running without postgres feature - using in-memory store");
            Arc::new(InMemoryPostRepository::new())
        };

        tracing::info!("Application state initialized");

        Self {
            service: PostService::new(posts.clone()),
            posts,
        }
    }
}
