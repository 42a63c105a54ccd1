//! Shared domain types for the Reel video-generation backend.
//!
//! This crate holds the pieces every other crate depends on: primitive
//! type aliases, the domain error taxonomy, the job status state machine,
//! and the WebSocket message type constants.

pub mod error;
pub mod job_events;
pub mod job_status;
pub mod types;
