use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::Submitter;
use crate::ws::{SessionRegistry, WsManager};
use reel_sora::VideoProvider;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: reel_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// User-to-channel bindings for live update delivery.
    pub sessions: Arc<SessionRegistry>,
    /// Remote video-generation provider gateway.
    pub provider: Arc<dyn VideoProvider>,
    /// Event bus carrying job updates from poll loops to the router.
    pub bus: Arc<reel_events::EventBus>,
    /// Submission orchestrator (create + remix, spawns poll loops).
    pub submitter: Arc<Submitter>,
}
