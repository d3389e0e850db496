//! # Posts API Server
//!
//! The main entry point for the Actix-web HTTP server and the
//! user-deletion event consumer.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod config;
mod handlers;
mod listener;
mod middleware;
mod state;

use config::AppConfig;
use posts_infra::InMemoryEventQueue;
use state::AppState;

#[cfg(feature = "redis")]
use posts_infra::{RedisConfig, RedisEventQueue};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = AppConfig::from_env();

    tracing::info!(
        "Starting Posts API Server on {}:{}",
        config.host,
        config.port
    );

    // Build application state
    let state = AppState::new(&config).await;

    // Start the user-deletion consumer on the configured event transport.
    start_user_deleted_consumer(&config, &state).await;

    // Start HTTP server
    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(app_state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

/// Subscribe the user-deletion handler, preferring Redis when configured.
async fn start_user_deleted_consumer(config: &AppConfig, state: &AppState) {
    #[cfg(feature = "redis")]
    if config.redis_url.is_some() {
        match RedisEventQueue::new(RedisConfig::from_env()).await {
            Ok(queue) => {
                if let Err(e) = listener::subscribe_user_deleted(
                    &queue,
                    state.posts.clone(),
                    &config.user_deleted_channel,
                )
                .await
                {
                    tracing::error!(error = %e, "Failed to subscribe user-deletion consumer");
                }
                return;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "Redis unavailable, falling back to in-memory event queue"
                );
            }
        }
    }

    let queue = InMemoryEventQueue::default();
    if let Err(e) =
        listener::subscribe_user_deleted(&queue, state.posts.clone(), &config.user_deleted_channel)
            .await
    {
        tracing::error!(error = %e, "Failed to subscribe user-deletion consumer");
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,post_api=debug,posts_infra=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}
