//! # Posts Infrastructure
//!
//! Concrete implementations of the ports defined in `posts-core`.
//! This crate contains the post store backends and the event transports.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL post store via SeaORM
//! - `redis` - Redis-backed event queue

pub mod database;
pub mod events;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, InMemoryPostRepository};
pub use events::InMemoryEventQueue;

// Re-exports - Postgres
#[cfg(feature = "postgres")]
pub use database::PostgresPostRepository;

// Re-exports - Redis
#[cfg(feature = "redis")]
pub use events::{RedisConfig, RedisEventQueue};
