//! Video job entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use reel_core::types::{DbId, Timestamp};

/// A row from the `videos` table: one user-submitted generation or remix
/// request and its tracked lifecycle.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub user_id: DbId,
    pub prompt: String,
    pub model: String,
    pub size: Option<String>,
    pub seconds: Option<i32>,
    /// `queued | in_progress | completed | failed` (mirrors the provider).
    pub status: String,
    /// Last provider-reported progress percentage.
    pub progress: Option<i16>,
    /// Provider-side job id; set once at insert, never reassigned.
    pub sora_video_id: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a new video row after the provider accepted the job.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub user_id: DbId,
    pub prompt: String,
    pub model: String,
    pub size: Option<String>,
    pub seconds: Option<i32>,
    pub status: String,
    pub sora_video_id: String,
}

/// Query parameters for `GET /api/videos`.
#[derive(Debug, Deserialize)]
pub struct VideoListQuery {
    /// Maximum number of results per page. Defaults to 20, capped at 100.
    pub limit: Option<i64>,
    /// 1-based page number. Defaults to 1.
    pub page: Option<i64>,
}
