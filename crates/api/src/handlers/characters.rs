//! Reference-image catalog handler.

use axum::extract::{Path, State};
use axum::Json;
use faceframe_cloud::storage::ReferenceImage;
use faceframe_core::session::Gender;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/characters/{gender}
pub async fn list_by_gender(
    State(state): State<AppState>,
    Path(gender): Path<String>,
) -> AppResult<Json<DataResponse<Vec<ReferenceImage>>>> {
    let gender: Gender = gender.parse()?;
    let images = state.storage.reference_images(gender).await?;
    Ok(Json(DataResponse { data: images }))
}
