//! Remote compute job model.
//!
//! A [`JobHandle`] is the provider's reference to an in-flight face-swap
//! request. Status only moves forward: `Queued -> InProgress -> {Completed, Failed}`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::session::SessionId;

/// Provider-assigned job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a remote job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// Map a provider status token.
    ///
    /// `CANCELLED` and `TIMED_OUT` are terminal on the provider side and
    /// fold into [`JobStatus::Failed`]. Unknown tokens yield `None`; the
    /// poller treats them as non-terminal.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "IN_QUEUE" | "QUEUED" => Some(Self::Queued),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" | "CANCELLED" | "TIMED_OUT" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::InProgress => 1,
            Self::Completed | Self::Failed => 2,
        }
    }
}

/// A submitted job and the last status observed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub job_id: JobId,
    pub session_id: SessionId,
    status: JobStatus,
}

impl JobHandle {
    /// A freshly submitted job starts out queued.
    pub fn submitted(job_id: JobId, session_id: SessionId) -> Self {
        Self {
            job_id,
            session_id,
            status: JobStatus::Queued,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Apply an observed status.
    ///
    /// Observations that would move the job backwards, or away from a
    /// terminal state, are ignored. Returns `true` if the status changed.
    pub fn observe(&mut self, observed: JobStatus) -> bool {
        if self.status.is_terminal() || observed.rank() <= self.status.rank() {
            return false;
        }
        self.status = observed;
        true
    }
}

/// Inputs for a face-swap job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobRequest {
    pub source_image_url: String,
    pub target_image_url: String,
    pub unique_id: SessionId,
}
