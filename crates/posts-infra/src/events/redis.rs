//! Redis event queue implementation using LIST operations.
//!
//! `publish` pushes to the tail of a per-channel list; the consumer pops
//! from the head with a blocking pop. A nacked message is pushed back to
//! the tail, which is how redelivery (at-least-once) is preserved across
//! the queue.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use posts_core::ports::{Delivery, EventBus, EventError, EventMessage};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Timeout for the blocking pop (seconds)
    pub pop_timeout: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            pop_timeout: 5,
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            pop_timeout: std::env::var("REDIS_POP_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }
}

/// Redis-backed event queue.
pub struct RedisEventQueue {
    conn: ConnectionManager,
    config: RedisConfig,
}

impl RedisEventQueue {
    pub async fn new(config: RedisConfig) -> Result<Self, EventError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| EventError::Connection(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn_manager_fut = ConnectionManager::new(client);
        let conn = tokio::time::timeout(config.connect_timeout, conn_manager_fut)
            .await
            .map_err(|_| EventError::Connection("Connection timed out".to_string()))?
            .map_err(|e| EventError::Connection(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis event queue");

        Ok(Self { conn, config })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, EventError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn queue_key(channel: &str) -> String {
        format!("events:{channel}")
    }
}

#[async_trait]
impl EventBus for RedisEventQueue {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), EventError> {
        let mut conn = self.conn.clone();
        conn.rpush::<_, _, ()>(Self::queue_key(channel), payload)
            .await
            .map_err(|e| EventError::Publish(e.to_string()))?;
        Ok(())
    }

    async fn subscribe<F>(&self, channel: &str, handler: F) -> Result<(), EventError>
    where
        F: Fn(EventMessage) -> Pin<Box<dyn Future<Output = Delivery> + Send>>
            + Send
            + Sync
            + 'static,
    {
        let mut conn = self.conn.clone();
        let channel_name = channel.to_string();
        let key = Self::queue_key(channel);
        let handler = Arc::new(handler);
        let pop_timeout = self.config.pop_timeout;

        tokio::spawn(async move {
            tracing::info!(channel = %channel_name, "Redis consumer started");

            loop {
                let popped: Result<Option<(String, String)>, _> =
                    conn.blpop(&key, pop_timeout as f64).await;

                let payload = match popped {
                    Ok(Some((_, payload))) => payload,
                    Ok(None) => continue,
                    Err(e) => {
                        tracing::error!(channel = %channel_name, error = %e, "Blocking pop failed");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                        continue;
                    }
                };

                let verdict = handler(EventMessage {
                    channel: channel_name.clone(),
                    payload: payload.clone(),
                })
                .await;

                if let Delivery::Requeue(reason) = verdict {
                    tracing::warn!(
                        channel = %channel_name,
                        reason = %reason,
                        "Message nacked, pushing back for redelivery"
                    );
                    if let Err(e) = conn.rpush::<_, _, ()>(&key, &payload).await {
                        tracing::error!(channel = %channel_name, error = %e, "Failed to requeue message");
                    }
                    // Backoff before the next pop so a dead store does not
                    // spin the consumer.
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });

        Ok(())
    }
}
