use std::sync::Arc;

use faceframe_cloud::storage::SupabaseStorage;
use faceframe_pipeline::Pipeline;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub pool: faceframe_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub pipeline: Arc<Pipeline>,
    /// Reference-image catalog.
    pub storage: Arc<SupabaseStorage>,
}
