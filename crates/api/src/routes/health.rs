use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when every dependency below is ready, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    /// Whether the session record database is reachable.
    pub db_healthy: bool,
    /// Whether the frame image can be found on disk.
    pub frame_ready: bool,
    /// Longest a session may wait for the worker's output, in seconds.
    pub polling_budget_secs: u64,
}

/// GET /health -- database, frame asset and polling budget.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = faceframe_db::health_check(&state.pool).await.is_ok();
    let frame_ready = tokio::fs::try_exists(&state.config.frame_image_path)
        .await
        .unwrap_or(false);

    let status = if db_healthy && frame_ready {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        frame_ready,
        polling_budget_secs: state.pipeline.polling().worst_case().as_secs(),
    })
}

/// Mount health check routes (root level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
