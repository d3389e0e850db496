//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod events;
mod repository;

pub use events::{Delivery, EventBus, EventError, EventMessage};
pub use repository::PostRepository;
