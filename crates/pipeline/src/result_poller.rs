//! Result poller: waits for the remote worker to write the session's
//! output column. This is the loop the pipeline advances on.

use faceframe_core::config::PollingConfig;
use faceframe_core::services::SessionRecordStore;
use faceframe_core::session::{SessionField, SessionId};

/// The output column stayed empty for the whole attempt budget.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No output for session {session_id} after {attempts} attempts")]
pub struct PollTimeout {
    pub session_id: SessionId,
    pub attempts: u32,
}

/// Poll the record store until the output column holds a non-blank value.
///
/// Attempts are strictly sequential: query, then wait one interval, then
/// query again. A failed query consumes its attempt and is retried; only
/// exhausting the budget is fatal. No wait follows the final attempt, so a
/// value first seen on attempt N is returned after `(N - 1) * interval`.
///
/// Returns the value trimmed of surrounding whitespace.
pub async fn poll_for_output(
    store: &dyn SessionRecordStore,
    session_id: SessionId,
    config: &PollingConfig,
) -> Result<String, PollTimeout> {
    for attempt in 1..=config.max_attempts {
        match store.read_field(session_id, SessionField::Output).await {
            Ok(Some(value)) if !value.trim().is_empty() => {
                tracing::info!(%session_id, attempt, "Processed image available");
                return Ok(value.trim().to_string());
            }
            Ok(_) => {
                tracing::debug!(%session_id, attempt, "Output not ready");
            }
            Err(e) => {
                tracing::warn!(%session_id, attempt, error = %e, "Output query failed");
            }
        }

        if attempt < config.max_attempts {
            tokio::time::sleep(config.interval).await;
        }
    }

    tracing::error!(%session_id, attempts = config.max_attempts, "Output polling timed out");
    Err(PollTimeout {
        session_id,
        attempts: config.max_attempts,
    })
}
