//! Live update delivery: event bus to WebSocket routing.

pub mod router;

pub use router::UpdateRouter;
