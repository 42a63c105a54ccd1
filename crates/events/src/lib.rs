//! Live-update event bus.
//!
//! The poll-loop engine publishes [`JobUpdate`]s here; the API layer's
//! update router consumes them in order and pushes each one to the owning
//! user's WebSocket connection.

pub mod bus;

pub use bus::{EventBus, JobUpdate};
