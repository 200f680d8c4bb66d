use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use faceframe_cloud::storage::CatalogError;
use faceframe_core::error::CoreError;
use faceframe_pipeline::PipelineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A fatal pipeline failure.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::MissingConfig(_) | CoreError::Internal(_) => {
                    tracing::error!(error = %core, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Pipeline errors ---
            AppError::Pipeline(err) => {
                let (status, code) = match err {
                    PipelineError::Upload { .. } => (StatusCode::BAD_GATEWAY, "UPLOAD_FAILED"),
                    PipelineError::Submission(_) => {
                        (StatusCode::BAD_GATEWAY, "SUBMISSION_FAILED")
                    }
                    PipelineError::PollTimeout { .. } => {
                        (StatusCode::GATEWAY_TIMEOUT, "PROCESSING_TIMEOUT")
                    }
                    PipelineError::Composition(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "COMPOSITION_FAILED")
                    }
                };
                tracing::error!(error = %err, code, "Pipeline failed");
                (status, code, err.to_string())
            }

            AppError::Catalog(err) => {
                tracing::error!(error = %err, "Reference catalog unavailable");
                (StatusCode::BAD_GATEWAY, "CATALOG_UNAVAILABLE", err.to_string())
            }

            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use faceframe_core::session::SessionId;

    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn pipeline_errors_map_to_gateway_statuses() {
        assert_eq!(
            status_of(PipelineError::Submission("down".into()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(
                PipelineError::Upload {
                    what: "captured photo",
                    reason: "403".into()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(
                PipelineError::PollTimeout {
                    session_id: SessionId::generate(),
                    attempts: 60
                }
                .into()
            ),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_of(PipelineError::Composition("bad png".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_is_a_bad_request() {
        assert_eq!(
            status_of(CoreError::Validation("gender".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn missing_config_does_not_leak_the_key() {
        let response = AppError::Core(CoreError::MissingConfig("RUNPOD_API_KEY")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
