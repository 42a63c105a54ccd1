//! The record-store seam consumed by the job engine.
//!
//! The submission orchestrator and poll loop never touch `sqlx` directly;
//! they go through [`VideoStore`] so tests can substitute an in-memory
//! implementation and drive the full engine without a database.

use async_trait::async_trait;

use reel_core::error::CoreError;
use reel_core::types::DbId;

use crate::models::video::{NewVideo, Video};
use crate::repositories::VideoRepo;
use crate::DbPool;

/// Persistence operations the job engine needs: insert on submission, then
/// read/update while the poll loop owns the record.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Insert a freshly submitted job. Exactly one row per submission.
    async fn insert(&self, input: &NewVideo) -> Result<Video, CoreError>;

    /// Fetch a record by internal id.
    async fn find_by_id(&self, id: DbId) -> Result<Option<Video>, CoreError>;

    /// Persist a non-terminal status/progress observation.
    async fn record_observation(
        &self,
        id: DbId,
        status: &str,
        progress: Option<i16>,
    ) -> Result<(), CoreError>;

    /// Finalize a record as completed. Provider URLs win only when present.
    async fn complete(
        &self,
        id: DbId,
        video_url: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<Video, CoreError>;

    /// Finalize a record as failed, keeping other fields as last known.
    async fn fail(&self, id: DbId) -> Result<(), CoreError>;
}

/// Production [`VideoStore`] backed by the Postgres pool.
pub struct PgVideoStore {
    pool: DbPool,
}

impl PgVideoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn store_error(err: sqlx::Error) -> CoreError {
    CoreError::Internal(format!("store error: {err}"))
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn insert(&self, input: &NewVideo) -> Result<Video, CoreError> {
        VideoRepo::insert(&self.pool, input)
            .await
            .map_err(store_error)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Video>, CoreError> {
        VideoRepo::find_by_id(&self.pool, id)
            .await
            .map_err(store_error)
    }

    async fn record_observation(
        &self,
        id: DbId,
        status: &str,
        progress: Option<i16>,
    ) -> Result<(), CoreError> {
        VideoRepo::record_observation(&self.pool, id, status, progress)
            .await
            .map_err(store_error)
    }

    async fn complete(
        &self,
        id: DbId,
        video_url: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<Video, CoreError> {
        VideoRepo::complete(&self.pool, id, video_url, thumbnail_url)
            .await
            .map_err(store_error)
    }

    async fn fail(&self, id: DbId) -> Result<(), CoreError> {
        VideoRepo::fail(&self.pool, id).await.map_err(store_error)
    }
}
