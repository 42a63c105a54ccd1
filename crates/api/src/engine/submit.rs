//! Submission orchestrator: validate, moderate, submit to the provider,
//! persist the record, and launch the detached poll loop.
//!
//! The HTTP caller gets its response as soon as the record exists; polling
//! proceeds independently of the request/response cycle.

use std::sync::Arc;

use reel_core::error::CoreError;
use reel_core::types::DbId;
use reel_db::models::video::{NewVideo, Video};
use reel_db::store::VideoStore;
use reel_events::EventBus;
use reel_sora::{CreateVideoParams, VideoProvider, DEFAULT_MODEL};

use crate::engine::poller::PollEngine;

/// Prefix marking remixed prompts for display purposes.
const REMIX_PROMPT_PREFIX: &str = "Remix: ";

/// A validated-on-entry submission request.
#[derive(Debug, Default)]
pub struct SubmitVideoRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub size: Option<String>,
    pub seconds: Option<i32>,
    /// Raw reference image bytes, consumed at submission and never stored.
    pub reference_image: Option<Vec<u8>>,
}

/// Orchestrates new submissions and remixes.
///
/// Constructed once at startup; the live-update transport (bus + router)
/// exists before the server accepts any request, so every accepted
/// submission has somewhere to publish its updates.
pub struct Submitter {
    store: Arc<dyn VideoStore>,
    provider: Arc<dyn VideoProvider>,
    bus: Arc<EventBus>,
}

impl Submitter {
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

    /// Submit a new generation request.
    ///
    /// Ordering contract: validation, then moderation, then the provider
    /// create call, then the record insert. A failure at any step leaves no
    /// record behind. On success the poll loop is already running when this
    /// returns.
    pub async fn submit(
        &self,
        user_id: DbId,
        request: SubmitVideoRequest,
    ) -> Result<Video, CoreError> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(CoreError::Validation("Prompt is required".into()));
        }

        self.moderate(prompt).await?;

        let model = request
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let params = CreateVideoParams {
            prompt: prompt.to_string(),
            model: model.clone(),
            size: request.size.clone(),
            seconds: request.seconds,
            reference_image: request.reference_image,
        };
        let job = self
            .provider
            .create(&params)
            .await
            .map_err(|e| CoreError::Upstream(e.to_string()))?;

        let video = self
            .store
            .insert(&NewVideo {
                user_id,
                prompt: prompt.to_string(),
                model,
                size: request.size,
                seconds: request.seconds,
                status: job.status.clone(),
                sora_video_id: job.id,
            })
            .await?;

        tracing::info!(
            video_id = video.id,
            user_id,
            sora_id = ?video.sora_video_id,
            "Video generation started",
        );

        self.spawn_poll(&video);
        Ok(video)
    }

    /// Submit a remix of an existing video.
    ///
    /// Shares the submission contract, except the provider call derives
    /// from the original's provider job id, and the new record copies
    /// model/size/seconds from the original with the prompt prefixed for
    /// display. The original record is never mutated.
    pub async fn remix(
        &self,
        user_id: DbId,
        original: &Video,
        prompt: &str,
    ) -> Result<Video, CoreError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(CoreError::Validation("Prompt is required for remix".into()));
        }

        self.moderate(prompt).await?;

        let sora_id = original.sora_video_id.as_deref().ok_or(CoreError::NotFound {
            entity: "Video",
            id: original.id,
        })?;

        let job = self
            .provider
            .remix(sora_id, prompt)
            .await
            .map_err(|e| CoreError::Upstream(e.to_string()))?;

        let video = self
            .store
            .insert(&NewVideo {
                user_id,
                prompt: format!("{REMIX_PROMPT_PREFIX}{prompt}"),
                model: original.model.clone(),
                size: original.size.clone(),
                seconds: original.seconds,
                status: job.status.clone(),
                sora_video_id: job.id,
            })
            .await?;

        tracing::info!(
            video_id = video.id,
            original_id = original.id,
            user_id,
            "Video remix started",
        );

        self.spawn_poll(&video);
        Ok(video)
    }

    /// Reject flagged prompts before any side effect. Allowed verdicts
    /// (including the no-moderation-configured case) fall through.
    async fn moderate(&self, prompt: &str) -> Result<(), CoreError> {
        let verdict = self.provider.moderate(prompt).await;
        if !verdict.allowed {
            tracing::warn!(flagged = verdict.flagged, "Prompt rejected by moderation");
            return Err(CoreError::PolicyViolation(
                "Prompt violates content policy".into(),
            ));
        }
        Ok(())
    }

    /// Launch the poll loop for a freshly inserted record, detached from
    /// the request that created it.
    fn spawn_poll(&self, video: &Video) {
        PollEngine::new(
            Arc::clone(&self.store),
            Arc::clone(&self.provider),
            Arc::clone(&self.bus),
        )
        .spawn(video.id, video.user_id);
    }
}
