//! Poll-loop engine: drives a single job from creation to terminal state.
//!
//! One detached task per in-flight job. Each iteration retrieves the
//! provider's view of the job, persists it, and publishes a live update;
//! between polls the task sleeps on a linearly growing backoff. The
//! provider discourages tight polling on long-running media jobs, so the
//! delay grows from 10s to a 20s ceiling.

use std::sync::Arc;
use std::time::Duration;

use reel_core::error::CoreError;
use reel_core::job_status::JobStatus;
use reel_core::types::DbId;
use reel_db::store::VideoStore;
use reel_events::{EventBus, JobUpdate};
use reel_sora::{SoraApiError, VideoProvider};

/// Hard cap on provider polls per job (roughly 55 minutes at the backoff
/// ceiling). Exceeding it fails the job.
pub const MAX_POLL_ATTEMPTS: u32 = 180;

/// Base delay between polls.
const BASE_DELAY_MS: u64 = 10_000;

/// Per-attempt delay increment.
const DELAY_STEP_MS: u64 = 1_000;

/// Backoff ceiling.
const MAX_DELAY_MS: u64 = 20_000;

/// Delay before the next poll after `attempts` completed polls.
fn poll_delay(attempts: u32) -> Duration {
    Duration::from_millis((BASE_DELAY_MS + u64::from(attempts) * DELAY_STEP_MS).min(MAX_DELAY_MS))
}

/// Reasons a poll loop terminates without a completed record.
///
/// These never surface to the HTTP caller (who already received a 201);
/// they are logged and reflected on the record as `failed`.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("video {0} not found in store")]
    MissingRecord(DbId),

    #[error("video {0} has no provider job id")]
    MissingProviderId(DbId),

    #[error("provider reported generation failure")]
    Failed,

    #[error("no terminal status after {0} attempts")]
    Timeout(u32),

    #[error(transparent)]
    Provider(#[from] SoraApiError),

    #[error(transparent)]
    Store(#[from] CoreError),
}

/// Drives one job's lifecycle against the provider.
///
/// Cheap to clone; all collaborators are behind `Arc`.
#[derive(Clone)]
pub struct PollEngine {
    store: Arc<dyn VideoStore>,
    provider: Arc<dyn VideoProvider>,
    bus: Arc<EventBus>,
}

impl PollEngine {
    pub fn new(
        store: Arc<dyn VideoStore>,
        provider: Arc<dyn VideoProvider>,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            store,
            provider,
            bus,
        }
    }

    /// Launch the poll loop as a detached task.
    ///
    /// Fire-and-forget from the caller's perspective: all errors are
    /// handled inside the task and can never reach the spawning request
    /// handler or another job's loop.
    pub fn spawn(&self, video_id: DbId, user_id: DbId) -> tokio::task::JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move { engine.run(video_id, user_id).await })
    }

    /// Run the loop to a terminal state, applying the shared failure
    /// handler when it ends any way other than `completed`.
    pub async fn run(&self, video_id: DbId, user_id: DbId) {
        if let Err(e) = self.drive(video_id, user_id).await {
            tracing::error!(video_id, error = %e, "Video processing failed");

            // Persist the failure (other fields keep their last known
            // values) and emit exactly one failure update.
            if let Err(store_err) = self.store.fail(video_id).await {
                tracing::error!(video_id, error = %store_err, "Failed to mark video as failed");
            }
            self.bus.publish(JobUpdate::failed(video_id, user_id));
        }
    }

    /// The poll loop proper. Returns `Ok(())` only when the job completed
    /// and the final record update was published.
    async fn drive(&self, video_id: DbId, user_id: DbId) -> Result<(), PollError> {
        let video = self
            .store
            .find_by_id(video_id)
            .await?
            .ok_or(PollError::MissingRecord(video_id))?;
        let sora_id = video
            .sora_video_id
            .ok_or(PollError::MissingProviderId(video_id))?;

        tracing::info!(video_id, sora_id = %sora_id, "Tracking video generation");

        let mut attempts: u32 = 0;
        while attempts < MAX_POLL_ATTEMPTS {
            let job = self.provider.retrieve(&sora_id).await?;

            match JobStatus::parse(&job.status) {
                Some(JobStatus::Completed) => {
                    // Provider-asserted URLs win only when present; never
                    // overwrite a stored URL with an absent one.
                    let record = self
                        .store
                        .complete(video_id, job.url.as_deref(), job.thumbnail_url.as_deref())
                        .await?;
                    self.bus.publish(JobUpdate::completed(&record));
                    tracing::info!(video_id, "Video generation completed");
                    return Ok(());
                }
                Some(JobStatus::Failed) => return Err(PollError::Failed),
                _ => {
                    // Unknown statuses are treated as non-terminal and
                    // persisted verbatim.
                    self.store
                        .record_observation(video_id, &job.status, job.progress)
                        .await?;
                    self.bus.publish(JobUpdate::progress(
                        video_id,
                        user_id,
                        &job.status,
                        job.progress,
                    ));
                    tracing::debug!(
                        video_id,
                        status = %job.status,
                        progress = ?job.progress,
                        attempt = attempts,
                        "Video still processing",
                    );
                }
            }

            tokio::time::sleep(poll_delay(attempts)).await;
            attempts += 1;
        }

        Err(PollError::Timeout(MAX_POLL_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_linearly_from_ten_seconds() {
        assert_eq!(poll_delay(0), Duration::from_secs(10));
        assert_eq!(poll_delay(1), Duration::from_millis(11_000));
        assert_eq!(poll_delay(5), Duration::from_millis(15_000));
    }

    #[test]
    fn delay_is_capped_at_twenty_seconds() {
        assert_eq!(poll_delay(10), Duration::from_secs(20));
        assert_eq!(poll_delay(11), Duration::from_secs(20));
        assert_eq!(poll_delay(179), Duration::from_secs(20));
    }
}
