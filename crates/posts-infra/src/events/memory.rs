//! In-memory event queue.
//!
//! This is a fallback when Redis is not available.
//! Works within a single process only; messages are lost on restart.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};

use posts_core::ports::{Delivery, EventBus, EventError, EventMessage};

/// In-memory event queue configuration.
#[derive(Debug, Clone)]
pub struct InMemoryEventQueueConfig {
    /// Channel buffer size.
    pub buffer_size: usize,
    /// How often a nacked message is redelivered before being dropped.
    pub max_redeliveries: u32,
    /// Base delay before a redelivery, multiplied by the attempt count.
    pub redelivery_delay_ms: u64,
}

impl Default for InMemoryEventQueueConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            max_redeliveries: 25,
            redelivery_delay_ms: 100,
        }
    }
}

struct QueuedMessage {
    payload: String,
    attempts: u32,
}

struct ChannelSlot {
    tx: mpsc::Sender<QueuedMessage>,
    // Held until a subscriber claims the channel.
    rx: Option<mpsc::Receiver<QueuedMessage>>,
}

/// In-memory event queue with queue (not fan-out) semantics: one consumer
/// per channel, nacked messages are re-enqueued.
pub struct InMemoryEventQueue {
    channels: Arc<RwLock<HashMap<String, ChannelSlot>>>,
    config: InMemoryEventQueueConfig,
}

impl InMemoryEventQueue {
    pub fn new(config: InMemoryEventQueueConfig) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    async fn slot_sender(&self, channel: &str) -> mpsc::Sender<QueuedMessage> {
        let mut channels = self.channels.write().await;
        channels
            .entry(channel.to_string())
            .or_insert_with(|| {
                let (tx, rx) = mpsc::channel(self.config.buffer_size);
                ChannelSlot { tx, rx: Some(rx) }
            })
            .tx
            .clone()
    }
}

impl Default for InMemoryEventQueue {
    fn default() -> Self {
        Self::new(InMemoryEventQueueConfig::default())
    }
}

#[async_trait]
impl EventBus for InMemoryEventQueue {
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), EventError> {
        let tx = self.slot_sender(channel).await;

        tx.send(QueuedMessage {
            payload: payload.to_string(),
            attempts: 0,
        })
        .await
        .map_err(|e| EventError::Publish(e.to_string()))?;

        tracing::debug!(channel = %channel, "Message published");
        Ok(())
    }

    async fn subscribe<F>(&self, channel: &str, handler: F) -> Result<(), EventError>
    where
        F: Fn(EventMessage) -> Pin<Box<dyn Future<Output = Delivery> + Send>>
            + Send
            + Sync
            + 'static,
    {
        let tx = self.slot_sender(channel).await;
        let mut rx = {
            let mut channels = self.channels.write().await;
            channels
                .get_mut(channel)
                .and_then(|slot| slot.rx.take())
                .ok_or_else(|| {
                    EventError::Subscribe(format!("channel '{channel}' already has a consumer"))
                })?
        };

        let channel_name = channel.to_string();
        let handler = Arc::new(handler);
        let max_redeliveries = self.config.max_redeliveries;
        let delay_ms = self.config.redelivery_delay_ms;

        tokio::spawn(async move {
            tracing::info!(channel = %channel_name, "Subscribed to channel");

            while let Some(mut msg) = rx.recv().await {
                msg.attempts += 1;

                let verdict = handler(EventMessage {
                    channel: channel_name.clone(),
                    payload: msg.payload.clone(),
                })
                .await;

                match verdict {
                    Delivery::Ack => {
                        tracing::debug!(channel = %channel_name, "Message acknowledged");
                    }
                    Delivery::Requeue(reason) => {
                        if msg.attempts > max_redeliveries {
                            tracing::error!(
                                channel = %channel_name,
                                attempts = msg.attempts,
                                reason = %reason,
                                "Message dropped after exhausting redeliveries"
                            );
                            continue;
                        }

                        tracing::warn!(
                            channel = %channel_name,
                            attempt = msg.attempts,
                            reason = %reason,
                            "Message nacked, requeueing"
                        );

                        // Small delay before redelivery to prevent tight loops.
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            tokio::time::sleep(tokio::time::Duration::from_millis(
                                delay_ms * msg.attempts as u64,
                            ))
                            .await;
                            if let Err(e) = tx.send(msg).await {
                                tracing::error!("Failed to requeue message: {}", e);
                            }
                        });
                    }
                }
            }

            tracing::info!(channel = %channel_name, "Channel closed");
        });

        Ok(())
    }
}
