//! Shared test doubles for the job engine tests: an in-memory record store
//! and a scripted provider, substituted through the same seams the
//! production wiring uses.

// Each test binary compiles its own copy and uses a different subset.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use reel_core::error::CoreError;
use reel_core::job_status::JobStatus;
use reel_core::types::DbId;
use reel_db::models::video::{NewVideo, Video};
use reel_db::store::VideoStore;
use reel_sora::{
    CreateVideoParams, DownloadVariant, ModerationVerdict, SoraApiError, VideoJob, VideoProvider,
};

// ---------------------------------------------------------------------------
// In-memory record store
// ---------------------------------------------------------------------------

/// `VideoStore` backed by a mutex-guarded map, mirroring the Postgres
/// implementation's transition semantics (terminal rows stay frozen, URL
/// precedence on completion).
#[derive(Default)]
pub struct MemStore {
    rows: Mutex<HashMap<DbId, Video>>,
    next_id: AtomicI64,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Place a fully built row directly into the store.
    pub fn put(&self, video: Video) {
        self.rows.lock().unwrap().insert(video.id, video);
    }

    /// Snapshot a row by id.
    pub fn get(&self, id: DbId) -> Option<Video> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

/// Build a video row the way an insert would.
pub fn video_row(id: DbId, user_id: DbId, status: &str, sora_video_id: Option<&str>) -> Video {
    let now = chrono::Utc::now();
    Video {
        id,
        user_id,
        prompt: "a cat on a skateboard".into(),
        model: "sora-2".into(),
        size: None,
        seconds: None,
        status: status.into(),
        progress: None,
        sora_video_id: sora_video_id.map(String::from),
        video_url: None,
        thumbnail_url: None,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl VideoStore for MemStore {
    async fn insert(&self, input: &NewVideo) -> Result<Video, CoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = chrono::Utc::now();
        let video = Video {
            id,
            user_id: input.user_id,
            prompt: input.prompt.clone(),
            model: input.model.clone(),
            size: input.size.clone(),
            seconds: input.seconds,
            status: input.status.clone(),
            progress: None,
            sora_video_id: Some(input.sora_video_id.clone()),
            video_url: None,
            thumbnail_url: None,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().insert(id, video.clone());
        Ok(video)
    }

    async fn find_by_id(&self, id: DbId) -> Result<Option<Video>, CoreError> {
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn record_observation(
        &self,
        id: DbId,
        status: &str,
        progress: Option<i16>,
    ) -> Result<(), CoreError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(video) = rows.get_mut(&id) {
            let terminal = JobStatus::parse(&video.status).is_some_and(JobStatus::is_terminal);
            if !terminal {
                video.status = status.into();
                video.progress = progress;
                video.updated_at = chrono::Utc::now();
            }
        }
        Ok(())
    }

    async fn complete(
        &self,
        id: DbId,
        video_url: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<Video, CoreError> {
        let mut rows = self.rows.lock().unwrap();
        let video = rows
            .get_mut(&id)
            .ok_or(CoreError::Internal("row missing".into()))?;
        video.status = JobStatus::Completed.as_str().into();
        video.progress = Some(100);
        if let Some(url) = video_url {
            video.video_url = Some(url.into());
        }
        if let Some(url) = thumbnail_url {
            video.thumbnail_url = Some(url.into());
        }
        video.updated_at = chrono::Utc::now();
        Ok(video.clone())
    }

    async fn fail(&self, id: DbId) -> Result<(), CoreError> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(video) = rows.get_mut(&id) {
            video.status = JobStatus::Failed.as_str().into();
            video.updated_at = chrono::Utc::now();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scripted provider
// ---------------------------------------------------------------------------

/// A `VideoJob` literal for scripting provider responses.
pub fn provider_job(id: &str, status: &str) -> VideoJob {
    VideoJob {
        id: id.into(),
        status: status.into(),
        progress: None,
        url: None,
        thumbnail_url: None,
    }
}

/// `VideoProvider` whose `retrieve` responses are fed from a script, with
/// call counters for exact-count assertions.
pub struct ScriptedProvider {
    /// Response for `create`; `None` simulates an upstream failure.
    pub create_response: Option<VideoJob>,
    /// Response for `remix`; `None` simulates an upstream failure.
    pub remix_response: Option<VideoJob>,
    /// Consumed front-to-back by `retrieve`.
    pub retrieve_script: Mutex<VecDeque<VideoJob>>,
    /// Returned by `retrieve` once the script is exhausted; `None` makes
    /// further polls fail with an API error.
    pub retrieve_fallback: Option<VideoJob>,
    /// When true, `moderate` flags every prompt.
    pub flag_prompts: bool,
    pub create_calls: AtomicUsize,
    pub retrieve_calls: AtomicUsize,
    pub moderate_calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            create_response: Some(provider_job("sora-job-1", "queued")),
            remix_response: Some(provider_job("sora-job-2", "queued")),
            retrieve_script: Mutex::new(VecDeque::new()),
            retrieve_fallback: None,
            flag_prompts: false,
            create_calls: AtomicUsize::new(0),
            retrieve_calls: AtomicUsize::new(0),
            moderate_calls: AtomicUsize::new(0),
        }
    }

    /// Script the sequence of `retrieve` responses.
    pub fn with_script(self, script: Vec<VideoJob>) -> Self {
        *self.retrieve_script.lock().unwrap() = script.into();
        self
    }

    pub fn retrieve_count(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    pub fn create_count(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn moderate_count(&self) -> usize {
        self.moderate_calls.load(Ordering::SeqCst)
    }

    fn upstream_error() -> SoraApiError {
        SoraApiError::Api {
            status: 500,
            body: "scripted failure".into(),
        }
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoProvider for ScriptedProvider {
    async fn create(&self, _params: &CreateVideoParams) -> Result<VideoJob, SoraApiError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.create_response.clone().ok_or_else(Self::upstream_error)
    }

    async fn retrieve(&self, _id: &str) -> Result<VideoJob, SoraApiError> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(job) = self.retrieve_script.lock().unwrap().pop_front() {
            return Ok(job);
        }
        self.retrieve_fallback
            .clone()
            .ok_or_else(Self::upstream_error)
    }

    async fn remix(&self, _id: &str, _prompt: &str) -> Result<VideoJob, SoraApiError> {
        self.remix_response.clone().ok_or_else(Self::upstream_error)
    }

    async fn delete(&self, _id: &str) -> Result<(), SoraApiError> {
        Ok(())
    }

    async fn download(
        &self,
        _id: &str,
        _variant: DownloadVariant,
    ) -> Result<Vec<u8>, SoraApiError> {
        Ok(Vec::new())
    }

    async fn moderate(&self, _text: &str) -> ModerationVerdict {
        self.moderate_calls.fetch_add(1, Ordering::SeqCst);
        if self.flag_prompts {
            ModerationVerdict {
                allowed: false,
                flagged: true,
                categories: None,
            }
        } else {
            ModerationVerdict::allowed()
        }
    }
}
