//! Wire DTOs for the Sora HTTP API.

use serde::Deserialize;

/// A video job as reported by the provider.
///
/// `status` is kept as the raw wire string; unknown values are treated as
/// non-terminal by callers.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoJob {
    /// Provider-assigned job identifier.
    pub id: String,
    pub status: String,
    /// Generation progress percentage, when the provider reports one.
    pub progress: Option<i16>,
    /// Media URL, present once generation completed.
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Parameters for submitting a new generation job.
#[derive(Debug, Clone, Default)]
pub struct CreateVideoParams {
    pub prompt: String,
    pub model: String,
    pub size: Option<String>,
    pub seconds: Option<i32>,
    /// Raw reference image bytes; consumed at submission only.
    pub reference_image: Option<Vec<u8>>,
}

/// Which rendition of a completed job to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadVariant {
    Video,
    Thumbnail,
}

/// Moderation outcome for a prompt.
#[derive(Debug, Clone)]
pub struct ModerationVerdict {
    pub allowed: bool,
    pub flagged: bool,
    pub categories: Option<serde_json::Value>,
}

impl ModerationVerdict {
    /// Verdict used when no moderation model is configured or the check
    /// itself fails (conservative allow).
    pub fn allowed() -> Self {
        Self {
            allowed: true,
            flagged: false,
            categories: None,
        }
    }
}

/// Response body of the `/moderations` endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct ModerationResponse {
    pub results: Vec<ModerationResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModerationResult {
    pub flagged: bool,
    pub categories: Option<serde_json::Value>,
}
