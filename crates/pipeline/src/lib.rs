//! Session transformation pipeline.
//!
//! [`Pipeline::run`] takes a captured photo and a chosen reference image
//! through upload, job submission, result polling, framing, and final
//! upload. The remote worker writing the session record's output column
//! is the single completion signal; the job-status watch running
//! alongside it is diagnostic only.

pub mod compose;
pub mod error;
pub mod job_watch;
pub mod orchestrator;
pub mod result_poller;

pub use compose::{Compositor, FileImageSource};
pub use error::PipelineError;
pub use job_watch::{JobOutcome, JobWatch};
pub use orchestrator::{ComposedArtifact, PersistenceFailure, PersistenceStep, Pipeline};
pub use result_poller::{poll_for_output, PollTimeout};
