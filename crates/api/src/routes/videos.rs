//! Route definitions for the `/videos` resource.
//!
//! All endpoints require authentication.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::videos;
use crate::state::AppState;

/// Routes mounted at `/videos`.
///
/// ```text
/// POST   /create            -> create_video
/// GET    /status/{id}       -> get_video_status
/// GET    /                  -> list_videos
/// GET    /{id}/download     -> download_video
/// DELETE /{id}              -> delete_video
/// POST   /remix/{id}        -> remix_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(videos::create_video))
        .route("/status/{id}", get(videos::get_video_status))
        .route("/", get(videos::list_videos))
        .route("/{id}/download", get(videos::download_video))
        .route("/{id}", delete(videos::delete_video))
        .route("/remix/{id}", post(videos::remix_video))
}
