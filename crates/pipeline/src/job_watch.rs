//! Background job-status poller.
//!
//! Watches a submitted job until the provider reports a terminal status,
//! the attempt budget runs out, or the watch is cancelled. Its outcome is
//! diagnostic only: the pipeline never waits on it to make progress, and
//! it is not an authoritative completion signal.
//!
//! A [`JobWatch`] owns its task. Dropping the watch cancels polling, so
//! the watch cannot outlive the pipeline run that started it.

use std::sync::Arc;

use faceframe_core::config::PollingConfig;
use faceframe_core::job::{JobHandle, JobStatus};
use faceframe_core::services::JobClient;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// How a job watch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    Completed,
    Failed,
    /// The attempt budget ran out before a terminal status was seen.
    TimedOut { attempts: u32 },
    /// The owner cancelled the watch (or the task was torn down).
    Cancelled,
}

/// Handle to a running job-status poller.
pub struct JobWatch {
    cancel: CancellationToken,
    task: JoinHandle<JobOutcome>,
    _guard: DropGuard,
}

impl JobWatch {
    /// Start polling `handle` on the current runtime.
    pub fn spawn(client: Arc<dyn JobClient>, handle: JobHandle, config: PollingConfig) -> Self {
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            poll_job_status(client.as_ref(), handle, &config, &task_cancel).await
        });
        Self {
            _guard: cancel.clone().drop_guard(),
            cancel,
            task,
        }
    }

    /// Stop polling. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the watch to end and return its outcome.
    pub async fn outcome(self) -> JobOutcome {
        let Self { task, _guard, .. } = self;
        let outcome = task.await.unwrap_or(JobOutcome::Cancelled);
        drop(_guard);
        outcome
    }
}

/// Poll `handle` until a terminal status, budget exhaustion, or cancellation.
///
/// Each attempt waits one interval and then queries once. A failed query
/// still consumes its attempt; it never extends or resets the budget.
pub async fn poll_job_status(
    client: &dyn JobClient,
    mut handle: JobHandle,
    config: &PollingConfig,
    cancel: &CancellationToken,
) -> JobOutcome {
    let job_id = handle.job_id.clone();
    let session_id = handle.session_id;

    for attempt in 1..=config.max_attempts {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(&handle),
            _ = tokio::time::sleep(config.interval) => {}
        }

        let queried = tokio::select! {
            biased;
            _ = cancel.cancelled() => return cancelled(&handle),
            result = client.status(&job_id) => result,
        };

        match queried {
            Ok(status) => {
                if handle.observe(status) {
                    tracing::debug!(%session_id, %job_id, attempt, ?status, "Job status changed");
                }
                match handle.status() {
                    JobStatus::Completed => {
                        tracing::info!(%session_id, %job_id, attempt, "Face-swap job completed");
                        return JobOutcome::Completed;
                    }
                    JobStatus::Failed => {
                        tracing::error!(%session_id, %job_id, attempt, "Face-swap job failed");
                        return JobOutcome::Failed;
                    }
                    JobStatus::Queued | JobStatus::InProgress => {}
                }
            }
            Err(e) => {
                tracing::warn!(
                    %session_id,
                    %job_id,
                    attempt,
                    error = %e,
                    "Job status query failed",
                );
            }
        }
    }

    tracing::error!(
        %session_id,
        %job_id,
        attempts = config.max_attempts,
        "Job status polling timed out",
    );
    JobOutcome::TimedOut {
        attempts: config.max_attempts,
    }
}

fn cancelled(handle: &JobHandle) -> JobOutcome {
    tracing::debug!(
        session_id = %handle.session_id,
        job_id = %handle.job_id,
        last_status = ?handle.status(),
        "Job status watch cancelled",
    );
    JobOutcome::Cancelled
}
