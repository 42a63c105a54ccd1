//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`JobUpdate`]s. It is
//! designed to be shared via `Arc<EventBus>` across the application.
//! Delivery is best effort: with no subscribers an event is dropped, and a
//! lagging subscriber observes `RecvError::Lagged` instead of back-pressure.

use tokio::sync::broadcast;

use reel_core::job_status::JobStatus;
use reel_core::types::DbId;
use reel_db::models::video::Video;

// ---------------------------------------------------------------------------
// JobUpdate
// ---------------------------------------------------------------------------

/// One observed change in a tracked job's lifecycle.
///
/// Progress updates carry the compact status/progress pair; the terminal
/// completion update carries the full persisted record so clients can
/// render the finished video without a follow-up fetch.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    /// Internal id of the video record.
    pub video_id: DbId,
    /// Owning user; used by the router to resolve the target channel.
    pub user_id: DbId,
    /// Raw provider status string.
    pub status: String,
    pub progress: Option<i16>,
    /// Full record payload, present only on the final completion update.
    pub record: Option<serde_json::Value>,
}

impl JobUpdate {
    /// A per-poll progress observation.
    pub fn progress(video_id: DbId, user_id: DbId, status: &str, progress: Option<i16>) -> Self {
        Self {
            video_id,
            user_id,
            status: status.to_string(),
            progress,
            record: None,
        }
    }

    /// The final update for a completed job, carrying the persisted record.
    pub fn completed(video: &Video) -> Self {
        Self {
            video_id: video.id,
            user_id: video.user_id,
            status: video.status.clone(),
            progress: video.progress,
            record: serde_json::to_value(video).ok(),
        }
    }

    /// The single failure update emitted by the poll loop's failure handler.
    pub fn failed(video_id: DbId, user_id: DbId) -> Self {
        Self {
            video_id,
            user_id,
            status: JobStatus::Failed.as_str().to_string(),
            progress: None,
            record: None,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out bus for job updates.
pub struct EventBus {
    sender: broadcast::Sender<JobUpdate>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an update to all current subscribers.
    ///
    /// If there are no active subscribers the update is silently dropped;
    /// there is no queued-delivery guarantee.
    pub fn publish(&self, update: JobUpdate) {
        // Ignore the SendError -- it only means there are zero receivers.
        let _ = self.sender.send(update);
    }

    /// Subscribe to all updates published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<JobUpdate> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive_single_subscriber() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(JobUpdate::progress(7, 42, "in_progress", Some(55)));

        let received = rx.recv().await.expect("should receive the update");
        assert_eq!(received.video_id, 7);
        assert_eq!(received.user_id, 42);
        assert_eq!(received.status, "in_progress");
        assert_eq!(received.progress, Some(55));
        assert!(received.record.is_none());
    }

    #[tokio::test]
    async fn updates_are_received_in_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        for status in ["queued", "in_progress", "completed"] {
            bus.publish(JobUpdate::progress(1, 1, status, None));
        }

        for expected in ["queued", "in_progress", "completed"] {
            let update = rx.recv().await.expect("should receive update");
            assert_eq!(update.status, expected);
        }
    }

    #[tokio::test]
    async fn multiple_subscribers_receive_same_update() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(JobUpdate::failed(3, 9));

        let u1 = rx1.recv().await.expect("subscriber 1 should receive");
        let u2 = rx2.recv().await.expect("subscriber 2 should receive");

        assert_eq!(u1.status, "failed");
        assert_eq!(u2.status, "failed");
        assert_eq!(u1.video_id, 3);
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = EventBus::default();
        // No subscribers -- this must not panic.
        bus.publish(JobUpdate::failed(1, 1));
    }
}
