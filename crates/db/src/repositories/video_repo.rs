//! Repository for the `videos` table.
//!
//! All status writes funnel through the dedicated transition methods below
//! so the forward-only state machine is enforced in one place: terminal
//! rows (`completed` / `failed`) are never updated by the observation or
//! refresh paths.

use sqlx::PgPool;

use reel_core::job_status::JobStatus;
use reel_core::types::DbId;

use crate::models::video::{NewVideo, Video, VideoListQuery};

/// Column list for `videos` queries.
const COLUMNS: &str = "\
    id, user_id, prompt, model, size, seconds, status, progress, \
    sora_video_id, video_url, thumbnail_url, created_at, updated_at";

/// Maximum page size for video listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for video listing.
const DEFAULT_LIMIT: i64 = 20;

/// Provides CRUD operations for video jobs.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a new video row. Called only after the provider accepted the
    /// submission, so `sora_video_id` is always present.
    pub async fn insert(pool: &PgPool, input: &NewVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos \
                 (user_id, prompt, model, size, seconds, status, sora_video_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(input.user_id)
            .bind(&input.prompt)
            .bind(&input.model)
            .bind(&input.size)
            .bind(input.seconds)
            .bind(&input.status)
            .bind(&input.sora_video_id)
            .fetch_one(pool)
            .await
    }

    /// Find a video by its internal ID regardless of owner.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a video by ID, scoped to its owner. Returns `None` when the row
    /// does not exist or belongs to another user.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Persist a non-terminal status observation from the poll loop.
    ///
    /// Terminal rows are left untouched: once `completed` or `failed` is
    /// persisted, no later observation may revert it.
    pub async fn record_observation(
        pool: &PgPool,
        id: DbId,
        status: &str,
        progress: Option<i16>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE videos \
             SET status = $2, progress = $3, updated_at = NOW() \
             WHERE id = $1 AND status NOT IN ($4, $5)",
        )
        .bind(id)
        .bind(status)
        .bind(progress)
        .bind(JobStatus::Completed.as_str())
        .bind(JobStatus::Failed.as_str())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Mark a video as completed with its resolved media URLs.
    ///
    /// Provider-asserted URLs take precedence only when present; an absent
    /// value never overwrites a previously stored URL.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        video_url: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "UPDATE videos \
             SET status = $2, progress = 100, \
                 video_url = COALESCE($3, video_url), \
                 thumbnail_url = COALESCE($4, thumbnail_url), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(JobStatus::Completed.as_str())
            .bind(video_url)
            .bind(thumbnail_url)
            .fetch_one(pool)
            .await
    }

    /// Mark a video as failed, leaving all other fields at their last
    /// known values.
    pub async fn fail(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE videos SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(JobStatus::Failed.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Apply a provider snapshot from the synchronous status read path.
    ///
    /// Same precedence rules as [`complete`](Self::complete); callers only
    /// invoke this for non-terminal rows.
    pub async fn apply_refresh(
        pool: &PgPool,
        id: DbId,
        status: &str,
        progress: Option<i16>,
        video_url: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "UPDATE videos \
             SET status = $2, \
                 progress = COALESCE($3, progress), \
                 video_url = COALESCE($4, video_url), \
                 thumbnail_url = COALESCE($5, thumbnail_url), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(status)
            .bind(progress)
            .bind(video_url)
            .bind(thumbnail_url)
            .fetch_one(pool)
            .await
    }

    /// List a user's videos, newest first, with the total row count for
    /// pagination.
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: DbId,
        params: &VideoListQuery,
    ) -> Result<(Vec<Video>, i64), sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let page = params.page.unwrap_or(1).max(1);
        let offset = (page - 1) * limit;

        let query = format!(
            "SELECT {COLUMNS} FROM videos \
             WHERE user_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        );
        let videos = sqlx::query_as::<_, Video>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM videos WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok((videos, total))
    }

    /// Delete a video row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
