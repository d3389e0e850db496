//! Event transport implementations.

mod memory;

pub use memory::{InMemoryEventQueue, InMemoryEventQueueConfig};

#[cfg(feature = "redis")]
mod redis;
#[cfg(feature = "redis")]
pub use self::redis::{RedisConfig, RedisEventQueue};
