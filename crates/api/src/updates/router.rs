//! Job-update-to-WebSocket routing engine.
//!
//! [`UpdateRouter`] subscribes to the event bus and delivers each
//! [`JobUpdate`] to the single channel currently bound to the owning user.
//! A single consumer task keeps per-job update ordering intact end to end.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;

use reel_core::job_events::MSG_TYPE_JOB_UPDATE;
use reel_events::JobUpdate;

use crate::ws::{SessionRegistry, WsManager};

/// Routes job updates to the owning user's WebSocket connection.
pub struct UpdateRouter {
    sessions: Arc<SessionRegistry>,
    ws_manager: Arc<WsManager>,
}

impl UpdateRouter {
    /// Create a new router over the shared registry and connection manager.
    pub fn new(sessions: Arc<SessionRegistry>, ws_manager: Arc<WsManager>) -> Self {
        Self {
            sessions,
            ws_manager,
        }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each update.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](reel_events::EventBus) is dropped at shutdown).
    pub async fn run(self, mut receiver: broadcast::Receiver<JobUpdate>) {
        loop {
            match receiver.recv().await {
                Ok(update) => self.deliver(&update).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Update router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, update router shutting down");
                    break;
                }
            }
        }
    }

    /// Deliver a single update to the owner's bound channel.
    ///
    /// Silent no-op when the user has no active channel: there is no queued
    /// delivery and no redelivery on reconnect -- reconnecting clients
    /// re-fetch current state through the ordinary read path.
    async fn deliver(&self, update: &JobUpdate) {
        let Some(channel_id) = self.sessions.resolve(update.user_id).await else {
            tracing::trace!(
                video_id = update.video_id,
                user_id = update.user_id,
                "No active channel for user, dropping update",
            );
            return;
        };

        let payload = wire_payload(update);
        let sent = self
            .ws_manager
            .send_to(&channel_id, Message::Text(payload.to_string().into()))
            .await;
        if !sent {
            tracing::debug!(
                channel_id = %channel_id,
                video_id = update.video_id,
                "Bound channel gone before delivery",
            );
        }
    }
}

/// Build the wire JSON for an update.
///
/// Terminal completion updates carry the full record under `video`; all
/// others use the compact `{id, status, progress}` shape.
fn wire_payload(update: &JobUpdate) -> serde_json::Value {
    match &update.record {
        Some(record) => serde_json::json!({
            "type": MSG_TYPE_JOB_UPDATE,
            "video": record,
        }),
        None => serde_json::json!({
            "type": MSG_TYPE_JOB_UPDATE,
            "id": update.video_id,
            "status": update.status,
            "progress": update.progress,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_update_uses_compact_payload() {
        let update = JobUpdate::progress(7, 1, "in_progress", Some(40));
        let payload = wire_payload(&update);

        assert_eq!(payload["type"], MSG_TYPE_JOB_UPDATE);
        assert_eq!(payload["id"], 7);
        assert_eq!(payload["status"], "in_progress");
        assert_eq!(payload["progress"], 40);
        assert!(payload.get("video").is_none());
    }

    #[test]
    fn terminal_update_carries_full_record() {
        let mut update = JobUpdate::progress(7, 1, "completed", Some(100));
        update.record = Some(serde_json::json!({
            "id": 7,
            "status": "completed",
            "video_url": "https://cdn.example/video.mp4",
        }));
        let payload = wire_payload(&update);

        assert_eq!(payload["type"], MSG_TYPE_JOB_UPDATE);
        assert_eq!(payload["video"]["status"], "completed");
        assert_eq!(
            payload["video"]["video_url"],
            "https://cdn.example/video.mp4"
        );
    }
}
