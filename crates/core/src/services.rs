//! Collaborator interfaces the pipeline is wired against.
//!
//! Concrete implementations live in `faceframe-db` (record store) and
//! `faceframe-cloud` (storage, compute provider, HTTP image loading).
//! The pipeline only ever sees `Arc<dyn Trait>`, so tests substitute
//! in-memory fakes and sessions never share a hidden global client.

use async_trait::async_trait;

use crate::job::{JobId, JobRequest, JobStatus};
use crate::session::{SessionField, SessionId, SessionRecord};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to store an asset.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UploadError {
    /// Refused locally before any request was made.
    #[error("Refusing to upload an empty payload for key {0}")]
    EmptyPayload(String),

    /// The transport failed (network, DNS, TLS, timeout).
    #[error("Upload request failed: {0}")]
    Request(String),

    /// The storage service answered with a non-2xx status.
    #[error("Storage rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Failure to read or write the session record.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("Record store query failed: {0}")]
    Query(String),

    #[error("No session record for {0}")]
    NotFound(SessionId),
}

/// Failure talking to the remote compute provider.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JobClientError {
    #[error("Compute request failed: {0}")]
    Request(String),

    #[error("Compute provider error ({status}): {body}")]
    Api { status: u16, body: String },

    /// A 2xx response that lacks the job identifier field.
    #[error("Compute provider response has no job id")]
    MissingJobId,

    /// A status token this client does not know.
    #[error("Unrecognised job status '{0}'")]
    UnexpectedStatus(String),
}

/// Failure to fetch image bytes.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImageLoadError {
    #[error("Failed to load image from {location}: {reason}")]
    Unavailable { location: String, reason: String },
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Durable blob storage that hands back a publicly resolvable URL.
#[async_trait]
pub trait AssetUploader: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError>;
}

/// Single-row-per-session persistence keyed by [`SessionId`].
///
/// `update_field` is last-write-wins; concurrent writers (this pipeline and
/// the remote worker) are not coordinated.
#[async_trait]
pub trait SessionRecordStore: Send + Sync {
    /// Insert the initial row for a session.
    async fn create_or_insert(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Overwrite one column of an existing row.
    async fn update_field(
        &self,
        session_id: SessionId,
        field: SessionField,
        value: &str,
    ) -> Result<(), StoreError>;

    /// Read one column; `None` when the row or value is absent.
    async fn read_field(
        &self,
        session_id: SessionId,
        field: SessionField,
    ) -> Result<Option<String>, StoreError>;
}

/// Remote compute provider running the face-swap model.
#[async_trait]
pub trait JobClient: Send + Sync {
    /// Submit a job and return the provider's identifier for it.
    async fn submit(&self, request: &JobRequest) -> Result<JobId, JobClientError>;

    /// Query a job's current status once.
    async fn status(&self, job_id: &JobId) -> Result<JobStatus, JobClientError>;

    /// One-shot completion check.
    async fn is_completed(&self, job_id: &JobId) -> Result<bool, JobClientError> {
        Ok(self.status(job_id).await? == JobStatus::Completed)
    }
}

/// Anything that can produce raw (still encoded) image bytes for a location.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn load(&self, location: &str) -> Result<Vec<u8>, ImageLoadError>;
}
