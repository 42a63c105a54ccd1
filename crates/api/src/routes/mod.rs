pub mod auth;
pub mod health;
pub mod videos;

use axum::routing::any;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                       WebSocket (token-authenticated live updates)
///
/// /auth/register            register (public)
/// /auth/login               login (public)
/// /auth/profile             profile (requires auth)
///
/// /videos/create            submit generation (POST)
/// /videos/status/{id}       current record, provider-refreshed (GET)
/// /videos                   list own videos (GET)
/// /videos/{id}/download     stream rendered content (GET)
/// /videos/{id}              delete (DELETE)
/// /videos/remix/{id}        start remix (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", any(ws::ws_handler))
        .nest("/auth", auth::router())
        .nest("/videos", videos::router())
}
