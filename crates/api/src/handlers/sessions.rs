//! Session handler: accepts one capture and runs it through the pipeline.
//!
//! The request stays open for the whole run, which is bounded by the
//! polling budget; `REQUEST_TIMEOUT_SECS` must exceed it.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use faceframe_core::session::{Attribution, Gender, Session, SessionId};
use faceframe_pipeline::PersistenceFailure;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a completed session.
#[derive(Debug, Serialize)]
pub struct SessionOutcome {
    pub session_id: SessionId,
    pub output_url: String,
    pub persistence_failures: Vec<PersistenceFailure>,
}

/// Multipart fields of `POST /sessions`.
#[derive(Debug, Default)]
struct SessionForm {
    photo: Option<Vec<u8>>,
    target_image_url: Option<String>,
    gender: Option<String>,
    name: Option<String>,
    email: Option<String>,
}

impl SessionForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "photo" => form.photo = Some(field.bytes().await?.to_vec()),
                "target_image_url" => form.target_image_url = Some(field.text().await?),
                "gender" => form.gender = Some(field.text().await?),
                "name" => form.name = non_blank(field.text().await?),
                "email" => form.email = non_blank(field.text().await?),
                other => {
                    tracing::debug!(field = other, "Ignoring unknown multipart field");
                }
            }
        }
        Ok(form)
    }

    fn into_parts(self) -> AppResult<(Session, Vec<u8>)> {
        let photo = self
            .photo
            .ok_or_else(|| AppError::BadRequest("Missing 'photo' field".into()))?;
        if photo.is_empty() {
            return Err(AppError::BadRequest("'photo' field is empty".into()));
        }
        let gender: Gender = self
            .gender
            .ok_or_else(|| AppError::BadRequest("Missing 'gender' field".into()))?
            .parse()?;
        let target = self
            .target_image_url
            .ok_or_else(|| AppError::BadRequest("Missing 'target_image_url' field".into()))?;

        let attribution = Attribution {
            user_name: self.name,
            user_email: self.email,
            ..Attribution::default()
        };
        let session = Session::new(gender, target, attribution)?;
        Ok((session, photo))
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// POST /api/v1/sessions
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<SessionOutcome>>)> {
    let (session, photo) = SessionForm::read(multipart).await?.into_parts()?;
    let session_id = session.session_id();
    tracing::info!(%session_id, gender = session.gender().as_str(), "Session started");

    let artifact = state.pipeline.run(session, photo).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SessionOutcome {
                session_id,
                output_url: artifact.url,
                persistence_failures: artifact.persistence_failures,
            },
        }),
    ))
}
