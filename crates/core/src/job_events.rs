//! WebSocket message type constants for job lifecycle updates.
//!
//! Used by the update router when pushing job state to connected clients.

/// The single channel-scoped message type. Carries either a compact
/// `{id, status, progress}` payload or the full video record on terminal
/// completion.
pub const MSG_TYPE_JOB_UPDATE: &str = "job:update";
