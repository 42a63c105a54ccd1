//! Handlers for the `/videos` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Submission and
//! remix delegate to the [`Submitter`](crate::engine::Submitter); reads go
//! straight through `VideoRepo`.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use reel_core::error::CoreError;
use reel_core::job_status::JobStatus;
use reel_core::types::DbId;
use reel_db::models::video::{Video, VideoListQuery};
use reel_db::repositories::VideoRepo;
use reel_sora::DownloadVariant;

use crate::engine::SubmitVideoRequest;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, Pagination};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/videos/create`.
#[derive(Debug, Deserialize)]
pub struct CreateVideoRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub size: Option<String>,
    pub seconds: Option<i32>,
    /// Optional base64-encoded reference image; consumed at submission,
    /// never stored.
    pub reference_image: Option<String>,
}

/// Request body for `POST /api/videos/remix/{id}`.
#[derive(Debug, Deserialize)]
pub struct RemixVideoRequest {
    pub prompt: String,
}

/// Response body for `GET /api/videos`.
#[derive(Debug, Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<Video>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a video scoped to its owner.
///
/// Returns `NotFound` both when the row does not exist and when it belongs
/// to another user, so ids are not probeable across accounts.
async fn find_owned(pool: &sqlx::PgPool, id: DbId, auth: &AuthUser) -> AppResult<Video> {
    VideoRepo::find_owned(pool, id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/videos/create
///
/// Submit a new generation request. Returns 201 with the created record as
/// soon as it exists; status tracking continues in a detached poll loop.
pub async fn create_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateVideoRequest>,
) -> AppResult<impl IntoResponse> {
    let reference_image = input
        .reference_image
        .map(|encoded| base64::engine::general_purpose::STANDARD.decode(encoded))
        .transpose()
        .map_err(|_| AppError::BadRequest("reference_image must be valid base64".into()))?;

    let video = state
        .submitter
        .submit(
            auth.user_id,
            SubmitVideoRequest {
                prompt: input.prompt,
                model: input.model,
                size: input.size,
                seconds: input.seconds,
                reference_image,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: video })))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/videos/status/{id}
///
/// Return the current record, refreshed from the provider while the job is
/// still in flight. Terminal records are returned as persisted -- they are
/// never reverted by a provider snapshot.
pub async fn get_video_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let video = find_owned(&state.pool, id, &auth).await?;

    let is_terminal = JobStatus::parse(&video.status).is_some_and(JobStatus::is_terminal);
    let Some(sora_id) = video.sora_video_id.clone().filter(|_| !is_terminal) else {
        return Ok(Json(DataResponse { data: video }));
    };

    let job = state.provider.retrieve(&sora_id).await?;
    let refreshed = VideoRepo::apply_refresh(
        &state.pool,
        video.id,
        &job.status,
        job.progress,
        job.url.as_deref(),
        job.thumbnail_url.as_deref(),
    )
    .await?;

    Ok(Json(DataResponse { data: refreshed }))
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/videos
///
/// List the authenticated user's videos, newest first, with pagination.
pub async fn list_videos(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<VideoListQuery>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let page = params.page.unwrap_or(1).max(1);

    let (videos, total) = VideoRepo::list_by_user(&state.pool, auth.user_id, &params).await?;

    Ok(Json(DataResponse {
        data: VideoListResponse {
            videos,
            pagination: Pagination::new(total, page, limit),
        },
    }))
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// GET /api/videos/{id}/download
///
/// Stream the rendered video content from the provider. Only available
/// once the record is completed.
pub async fn download_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let video = find_owned(&state.pool, id, &auth).await?;

    if JobStatus::parse(&video.status) != Some(JobStatus::Completed) {
        return Err(AppError::Core(CoreError::Validation(
            "Video is not completed yet".into(),
        )));
    }
    let sora_id = video.sora_video_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation("Video has no provider job id".into()))
    })?;

    let content = state
        .provider
        .download(&sora_id, DownloadVariant::Video)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"video-{id}.mp4\""),
            ),
        ],
        content,
    ))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/videos/{id}
///
/// Delete a record, best-effort requesting deletion from the provider
/// first. Provider failures are logged, never surfaced. Returns 204.
pub async fn delete_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let video = find_owned(&state.pool, id, &auth).await?;

    if let Some(sora_id) = &video.sora_video_id {
        if let Err(e) = state.provider.delete(sora_id).await {
            tracing::warn!(
                video_id = video.id,
                sora_id = %sora_id,
                error = %e,
                "Provider-side delete failed, removing local record anyway",
            );
        }
    }

    VideoRepo::delete(&state.pool, video.id).await?;

    tracing::info!(video_id = video.id, user_id = auth.user_id, "Video deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Remix
// ---------------------------------------------------------------------------

/// POST /api/videos/remix/{id}
///
/// Start a remix derived from an existing video. Creates a NEW record; the
/// original is never mutated.
pub async fn remix_video(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RemixVideoRequest>,
) -> AppResult<impl IntoResponse> {
    let original = find_owned(&state.pool, id, &auth).await?;

    let video = state
        .submitter
        .remix(auth.user_id, &original, &input.prompt)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: video })))
}
