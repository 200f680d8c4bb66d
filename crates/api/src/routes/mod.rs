pub mod characters;
pub mod health;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// GET  /characters/{gender}     reference images for a gender
/// POST /sessions                run the pipeline for one capture
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/characters", characters::router())
        .nest("/sessions", sessions::router())
}
