//! The provider seam consumed by the job engine.
//!
//! [`VideoProvider`] abstracts the remote generation service so the
//! submission orchestrator and poll loop can be driven by a scripted fake
//! in tests. [`SoraApi`](crate::api::SoraApi) is the production
//! implementation.

use async_trait::async_trait;

use crate::api::{SoraApi, SoraApiError};
use crate::messages::{CreateVideoParams, DownloadVariant, ModerationVerdict, VideoJob};

/// Remote operations of the video-generation service.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    /// Submit a new generation job.
    async fn create(&self, params: &CreateVideoParams) -> Result<VideoJob, SoraApiError>;

    /// Fetch the current state of a job.
    async fn retrieve(&self, id: &str) -> Result<VideoJob, SoraApiError>;

    /// Derive a new job from an existing one with a new prompt.
    async fn remix(&self, id: &str, prompt: &str) -> Result<VideoJob, SoraApiError>;

    /// Delete a job on the provider side. Best-effort for callers.
    async fn delete(&self, id: &str) -> Result<(), SoraApiError>;

    /// Download rendered content of a completed job.
    async fn download(&self, id: &str, variant: DownloadVariant) -> Result<Vec<u8>, SoraApiError>;

    /// Moderate a prompt. Implementations must only block on an affirmative
    /// flag; when moderation is unconfigured or unavailable they allow.
    async fn moderate(&self, text: &str) -> ModerationVerdict;
}

#[async_trait]
impl VideoProvider for SoraApi {
    async fn create(&self, params: &CreateVideoParams) -> Result<VideoJob, SoraApiError> {
        self.create_video(params).await
    }

    async fn retrieve(&self, id: &str) -> Result<VideoJob, SoraApiError> {
        self.retrieve_video(id).await
    }

    async fn remix(&self, id: &str, prompt: &str) -> Result<VideoJob, SoraApiError> {
        self.remix_video(id, prompt).await
    }

    async fn delete(&self, id: &str) -> Result<(), SoraApiError> {
        self.delete_video(id).await
    }

    async fn download(&self, id: &str, variant: DownloadVariant) -> Result<Vec<u8>, SoraApiError> {
        self.download_content(id, variant).await
    }

    async fn moderate(&self, text: &str) -> ModerationVerdict {
        self.moderate_prompt(text).await
    }
}
