//! Session record entity model.

use serde::Serialize;
use sqlx::FromRow;
use faceframe_core::types::Timestamp;

/// A row of `event_output_images`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionRow {
    pub id: i64,
    pub unique_id: uuid::Uuid,
    pub image_url: String,
    pub gender: String,
    pub character_image: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub event_id: String,
    pub user_id: String,
    pub credits_used: String,
    pub output: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
