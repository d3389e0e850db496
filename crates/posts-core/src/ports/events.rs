//! Event bus port - abstraction over at-least-once message transports.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

/// Message delivered on a channel.
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub channel: String,
    pub payload: String,
}

/// Verdict returned by a subscription handler.
///
/// `Requeue` tells the transport the message was not processed and must
/// become eligible for redelivery; handlers perform no internal retries.
#[derive(Debug)]
pub enum Delivery {
    /// Message processed, acknowledge it.
    Ack,
    /// Message not processed, redeliver it later.
    Requeue(String),
}

/// Event bus trait - abstraction over message transports with
/// at-least-once delivery.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a message to a channel.
    async fn publish(&self, channel: &str, payload: &str) -> Result<(), EventError>;

    /// Subscribe to a channel. The handler's [`Delivery`] verdict decides
    /// whether the message is acknowledged or redelivered.
    async fn subscribe<F>(&self, channel: &str, handler: F) -> Result<(), EventError>
    where
        F: Fn(EventMessage) -> Pin<Box<dyn Future<Output = Delivery> + Send>>
            + Send
            + Sync
            + 'static;
}

/// Event bus errors.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("Failed to publish: {0}")]
    Publish(String),

    #[error("Failed to subscribe: {0}")]
    Subscribe(String),

    #[error("Connection error: {0}")]
    Connection(String),
}
