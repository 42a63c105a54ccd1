//! REST client library for the Sora video-generation API.
//!
//! Provides typed wire DTOs, the [`provider::VideoProvider`] trait the job
//! engine depends on, and the [`api::SoraApi`] reqwest implementation.

pub mod api;
pub mod messages;
pub mod provider;

pub use api::{SoraApi, SoraApiError, SoraConfig};
pub use messages::{CreateVideoParams, DownloadVariant, ModerationVerdict, VideoJob};
pub use provider::VideoProvider;

/// Generation model used when a submission does not name one.
pub const DEFAULT_MODEL: &str = "sora-2";
