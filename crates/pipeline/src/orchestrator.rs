//! Pipeline orchestrator.
//!
//! Sequences one session from captured photo to framed artifact:
//!
//! 1. upload capture            (fatal)
//! 2. insert session record     (non-fatal)
//! 3. submit job, start watch   (fatal)
//! 4. poll record for output    (fatal on timeout)
//! 5. compose framed image      (fatal)
//! 6. upload framed image       (fatal)
//! 7. write framed URL to record (non-fatal)
//!
//! The job watch started in step 3 is held for the rest of the run and
//! cancelled when the run returns, whichever path it takes.

use std::sync::Arc;

use chrono::Utc;
use faceframe_core::config::PollingConfig;
use faceframe_core::job::{JobHandle, JobId, JobRequest};
use faceframe_core::naming::{upload_key, AssetKind};
use faceframe_core::services::{AssetUploader, JobClient, SessionRecordStore};
use faceframe_core::session::{Session, SessionField, SessionRecord};
use serde::Serialize;
use tracing::Instrument;

use crate::compose::Compositor;
use crate::error::PipelineError;
use crate::job_watch::JobWatch;
use crate::result_poller::poll_for_output;

/// Record-store write that failed without aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceStep {
    InitialRecord,
    OutputUpdate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistenceFailure {
    pub step: PersistenceStep,
    pub message: String,
}

/// Successful pipeline result.
#[derive(Debug, Clone)]
pub struct ComposedArtifact {
    /// Final session value, carrying source, output and composed URLs.
    pub session: Session,
    /// Public URL of the framed image.
    pub url: String,
    pub job_id: JobId,
    pub persistence_failures: Vec<PersistenceFailure>,
}

/// The transformation pipeline with its collaborators injected.
pub struct Pipeline {
    uploader: Arc<dyn AssetUploader>,
    store: Arc<dyn SessionRecordStore>,
    jobs: Arc<dyn JobClient>,
    compositor: Compositor,
    polling: PollingConfig,
}

impl Pipeline {
    pub fn new(
        uploader: Arc<dyn AssetUploader>,
        store: Arc<dyn SessionRecordStore>,
        jobs: Arc<dyn JobClient>,
        compositor: Compositor,
        polling: PollingConfig,
    ) -> Self {
        Self {
            uploader,
            store,
            jobs,
            compositor,
            polling,
        }
    }

    pub fn polling(&self) -> &PollingConfig {
        &self.polling
    }

    /// Run one session end to end.
    pub async fn run(
        &self,
        session: Session,
        photo: Vec<u8>,
    ) -> Result<ComposedArtifact, PipelineError> {
        let span = tracing::info_span!("pipeline", session_id = %session.session_id());
        self.run_inner(session, photo).instrument(span).await
    }

    async fn run_inner(
        &self,
        session: Session,
        photo: Vec<u8>,
    ) -> Result<ComposedArtifact, PipelineError> {
        let session_id = session.session_id();
        let mut persistence_failures = Vec::new();

        // 1. Capture upload.
        if photo.is_empty() {
            return Err(PipelineError::Upload {
                what: "captured photo",
                reason: "photo is empty".into(),
            });
        }
        let capture_key = upload_key(AssetKind::Capture, session_id, Utc::now());
        let source_url = self
            .uploader
            .upload(&capture_key, AssetKind::Capture.content_type(), photo)
            .await
            .map_err(|e| PipelineError::Upload {
                what: "captured photo",
                reason: e.to_string(),
            })?;
        tracing::info!(key = %capture_key, "Captured photo uploaded");
        let session = session.with_source_image_url(source_url.clone());

        // 2. Initial record.
        let insert = match SessionRecord::from_session(&session) {
            Ok(record) => self
                .store
                .create_or_insert(&record)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(message) = insert {
            tracing::warn!(error = %message, "Failed to store session record, continuing");
            persistence_failures.push(PersistenceFailure {
                step: PersistenceStep::InitialRecord,
                message,
            });
        }

        // 3. Submission. The watch stays alive until this function returns.
        let request = JobRequest {
            source_image_url: source_url,
            target_image_url: session.target_image_url().to_string(),
            unique_id: session_id,
        };
        let job_id = self
            .jobs
            .submit(&request)
            .await
            .map_err(|e| PipelineError::Submission(e.to_string()))?;
        let watch = JobWatch::spawn(
            Arc::clone(&self.jobs),
            JobHandle::submitted(job_id.clone(), session_id),
            self.polling,
        );

        // 4. Output column is the completion signal.
        let output_url = poll_for_output(self.store.as_ref(), session_id, &self.polling)
            .await
            .map_err(|e| PipelineError::PollTimeout {
                session_id: e.session_id,
                attempts: e.attempts,
            })?;
        let session = session.with_output_url(output_url.clone());

        // 5. Framing.
        let framed = self
            .compositor
            .compose(&output_url)
            .await
            .map_err(|e| PipelineError::Composition(e.to_string()))?;

        // 6. Framed upload.
        let framed_key = upload_key(AssetKind::Framed, session_id, Utc::now());
        let framed_url = self
            .uploader
            .upload(&framed_key, AssetKind::Framed.content_type(), framed)
            .await
            .map_err(|e| PipelineError::Upload {
                what: "framed image",
                reason: e.to_string(),
            })?;
        tracing::info!(key = %framed_key, "Framed image uploaded");

        let session = session
            .with_composed_output_url(framed_url.clone())
            .map_err(|e| PipelineError::Composition(e.to_string()))?;

        // 7. Overwrite the record's output with the framed URL.
        if let Err(e) = self
            .store
            .update_field(session_id, SessionField::Output, &framed_url)
            .await
        {
            tracing::warn!(error = %e, "Failed to record framed image URL, continuing");
            persistence_failures.push(PersistenceFailure {
                step: PersistenceStep::OutputUpdate,
                message: e.to_string(),
            });
        }

        if watch.is_finished() {
            let outcome = watch.outcome().await;
            tracing::debug!(?outcome, "Job watch finished before the pipeline");
        } else {
            watch.cancel();
        }

        tracing::info!(job_id = %job_id, url = %framed_url, "Pipeline completed");
        Ok(ComposedArtifact {
            session,
            url: framed_url,
            job_id,
            persistence_failures,
        })
    }
}
