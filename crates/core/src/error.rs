use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The prompt was rejected by content moderation. No side effects occur.
    #[error("Content policy violation: {0}")]
    PolicyViolation(String),

    /// A provider call failed during submission. The caller may retry the
    /// whole submission; no record exists for the failed attempt.
    #[error("Upstream provider error: {0}")]
    Upstream(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
