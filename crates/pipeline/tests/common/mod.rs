//! In-memory collaborators shared by the pipeline integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use faceframe_core::compositor::{CornerStyle, FrameLayout};
use faceframe_core::config::PollingConfig;
use faceframe_core::job::{JobId, JobRequest, JobStatus};
use faceframe_core::services::{
    AssetUploader, ImageLoadError, ImageSource, JobClient, JobClientError, SessionRecordStore,
    StoreError, UploadError,
};
use faceframe_core::session::{SessionField, SessionId, SessionRecord};
use faceframe_pipeline::{Compositor, Pipeline};
use image::{ImageFormat, Rgba, RgbaImage};
use tokio::sync::oneshot;

pub const FRAME_LOCATION: &str = "assets/outputframe.png";

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

/// Record store whose output reads follow a script, then repeat `fallback`.
#[derive(Default)]
pub struct MemoryStore {
    reads: Mutex<VecDeque<Result<Option<String>, StoreError>>>,
    fallback: Mutex<Option<String>>,
    pub inserted: Mutex<Vec<SessionRecord>>,
    pub updates: Mutex<Vec<(SessionId, SessionField, String)>>,
    read_count: AtomicU32,
    fail_insert: bool,
    fail_update: bool,
}

impl MemoryStore {
    /// Output is empty for `empty_reads` queries, then `url` forever.
    pub fn ready_after(empty_reads: usize, url: &str) -> Self {
        let store = Self::default();
        store.script((0..empty_reads).map(|_| Ok(None)));
        *store.fallback.lock().unwrap() = Some(url.to_string());
        store
    }

    /// Output never appears.
    pub fn never_ready() -> Self {
        Self::default()
    }

    /// Every record write fails.
    pub fn failing_writes(mut self) -> Self {
        self.fail_insert = true;
        self.fail_update = true;
        self
    }

    pub fn script(&self, reads: impl IntoIterator<Item = Result<Option<String>, StoreError>>) {
        self.reads.lock().unwrap().extend(reads);
    }

    pub fn reads(&self) -> u32 {
        self.read_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionRecordStore for MemoryStore {
    async fn create_or_insert(&self, record: &SessionRecord) -> Result<(), StoreError> {
        if self.fail_insert {
            return Err(StoreError::Query("insert refused".into()));
        }
        self.inserted.lock().unwrap().push(record.clone());
        Ok(())
    }

    async fn update_field(
        &self,
        session_id: SessionId,
        field: SessionField,
        value: &str,
    ) -> Result<(), StoreError> {
        if self.fail_update {
            return Err(StoreError::NotFound(session_id));
        }
        self.updates
            .lock()
            .unwrap()
            .push((session_id, field, value.to_string()));
        Ok(())
    }

    async fn read_field(
        &self,
        _session_id: SessionId,
        _field: SessionField,
    ) -> Result<Option<String>, StoreError> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        let scripted = self.reads.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.fallback.lock().unwrap().clone()))
    }
}

// ---------------------------------------------------------------------------
// Job client
// ---------------------------------------------------------------------------

pub struct ScriptedJobs {
    submit: Result<JobId, JobClientError>,
    status: JobStatus,
    pub submitted: Mutex<Vec<JobRequest>>,
    pub status_queries: AtomicU32,
}

impl ScriptedJobs {
    pub fn accepting(job_id: &str) -> Self {
        Self {
            submit: Ok(JobId::new(job_id)),
            status: JobStatus::InProgress,
            submitted: Mutex::new(Vec::new()),
            status_queries: AtomicU32::new(0),
        }
    }

    pub fn rejecting(error: JobClientError) -> Self {
        Self {
            submit: Err(error),
            ..Self::accepting("unused")
        }
    }

    pub fn queries(&self) -> u32 {
        self.status_queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobClient for ScriptedJobs {
    async fn submit(&self, request: &JobRequest) -> Result<JobId, JobClientError> {
        self.submitted.lock().unwrap().push(request.clone());
        self.submit.clone()
    }

    async fn status(&self, _job_id: &JobId) -> Result<JobStatus, JobClientError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.status)
    }
}

// ---------------------------------------------------------------------------
// Uploader
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingUploader {
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    /// Keys starting with this prefix are rejected.
    pub reject_prefix: Option<&'static str>,
}

impl RecordingUploader {
    pub fn keys(&self) -> Vec<String> {
        self.uploads
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl AssetUploader for RecordingUploader {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError> {
        if self.reject_prefix.is_some_and(|prefix| key.starts_with(prefix)) {
            return Err(UploadError::Rejected {
                status: 403,
                body: "bucket is read-only".into(),
            });
        }
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string(), bytes.len()));
        Ok(format!("https://cdn.test/{key}"))
    }
}

// ---------------------------------------------------------------------------
// Image sources
// ---------------------------------------------------------------------------

/// Serves fixed bytes per location.
#[derive(Default)]
pub struct MapImageSource {
    images: HashMap<String, Vec<u8>>,
}

impl MapImageSource {
    pub fn with(mut self, location: &str, bytes: Vec<u8>) -> Self {
        self.images.insert(location.to_string(), bytes);
        self
    }
}

#[async_trait]
impl ImageSource for MapImageSource {
    async fn load(&self, location: &str) -> Result<Vec<u8>, ImageLoadError> {
        self.images
            .get(location)
            .cloned()
            .ok_or_else(|| ImageLoadError::Unavailable {
                location: location.to_string(),
                reason: "HTTP 404".into(),
            })
    }
}

/// Completes a load only when the test releases it.
pub struct GatedImageSource {
    gate: Mutex<Option<oneshot::Receiver<Result<Vec<u8>, ImageLoadError>>>>,
}

impl GatedImageSource {
    pub fn new() -> (Self, oneshot::Sender<Result<Vec<u8>, ImageLoadError>>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                gate: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl ImageSource for GatedImageSource {
    async fn load(&self, location: &str) -> Result<Vec<u8>, ImageLoadError> {
        let gate = self.gate.lock().unwrap().take();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| {
                Err(ImageLoadError::Unavailable {
                    location: location.to_string(),
                    reason: "gate dropped".into(),
                })
            }),
            None => Err(ImageLoadError::Unavailable {
                location: location.to_string(),
                reason: "already loaded".into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A 120x180 frame: opaque border, transparent window.
pub fn frame_png() -> Vec<u8> {
    let img = RgbaImage::from_fn(120, 180, |x, y| {
        if (10..110).contains(&x) && (15..165).contains(&y) {
            Rgba([0, 0, 0, 0])
        } else {
            Rgba([200, 30, 30, 255])
        }
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

pub fn small_layout() -> FrameLayout {
    FrameLayout::FixedSizeCentered {
        width: 100,
        height: 150,
        corner_radius: 10,
        corners: CornerStyle::All,
    }
}

pub fn fast_polling(max_attempts: u32) -> PollingConfig {
    PollingConfig::new(Duration::from_millis(5), max_attempts).unwrap()
}

/// Compositor that serves `result_url` with a solid result image.
pub fn compositor_for(result_url: &str) -> Compositor {
    let results = MapImageSource::default().with(result_url, png(64, 96, [20, 120, 220, 255]));
    let frames = MapImageSource::default().with(FRAME_LOCATION, frame_png());
    Compositor::new(
        Arc::new(results),
        Arc::new(frames),
        FRAME_LOCATION,
        small_layout(),
    )
}

pub struct Harness {
    pub uploader: Arc<RecordingUploader>,
    pub store: Arc<MemoryStore>,
    pub jobs: Arc<ScriptedJobs>,
    pub pipeline: Pipeline,
}

impl Harness {
    pub fn new(
        uploader: RecordingUploader,
        store: MemoryStore,
        jobs: ScriptedJobs,
        compositor: Compositor,
        polling: PollingConfig,
    ) -> Self {
        let uploader = Arc::new(uploader);
        let store = Arc::new(store);
        let jobs = Arc::new(jobs);
        let pipeline = Pipeline::new(
            uploader.clone(),
            store.clone(),
            jobs.clone(),
            compositor,
            polling,
        );
        Self {
            uploader,
            store,
            jobs,
            pipeline,
        }
    }
}
