use faceframe_core::session::SessionId;

/// Fatal pipeline failures. Each aborts the run and carries one
/// human-readable message for the caller.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Failed to upload {what}: {reason}")]
    Upload { what: &'static str, reason: String },

    #[error("Failed to start face swap processing: {0}")]
    Submission(String),

    #[error("Timed out waiting for the processed image of session {session_id} after {attempts} attempts")]
    PollTimeout { session_id: SessionId, attempts: u32 },

    #[error("Failed to compose framed image: {0}")]
    Composition(String),
}
