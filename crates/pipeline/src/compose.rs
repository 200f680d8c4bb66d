//! Async front end for the pure compositor.
//!
//! The result image and the frame are loaded concurrently; the draw runs
//! once, on the blocking pool, after both loads have finished.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use faceframe_core::compositor::{compose_encoded, CompositionError, FrameLayout};
use faceframe_core::services::{ImageLoadError, ImageSource};

/// Loads image bytes from the local filesystem, resolving locations
/// against an optional root directory.
#[derive(Debug, Clone, Default)]
pub struct FileImageSource {
    root: Option<PathBuf>,
}

impl FileImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(location),
            None => PathBuf::from(location),
        }
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn load(&self, location: &str) -> Result<Vec<u8>, ImageLoadError> {
        let path = self.resolve(location);
        tokio::fs::read(&path)
            .await
            .map_err(|e| ImageLoadError::Unavailable {
                location: path.display().to_string(),
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Load(#[from] ImageLoadError),

    #[error(transparent)]
    Draw(#[from] CompositionError),

    #[error("Composition task failed: {0}")]
    Task(String),
}

/// Frames a processed result with a fixed decorative frame asset.
pub struct Compositor {
    result_source: Arc<dyn ImageSource>,
    frame_source: Arc<dyn ImageSource>,
    frame_location: String,
    layout: FrameLayout,
}

impl Compositor {
    pub fn new(
        result_source: Arc<dyn ImageSource>,
        frame_source: Arc<dyn ImageSource>,
        frame_location: impl Into<String>,
        layout: FrameLayout,
    ) -> Self {
        Self {
            result_source,
            frame_source,
            frame_location: frame_location.into(),
            layout,
        }
    }

    pub fn layout(&self) -> &FrameLayout {
        &self.layout
    }

    /// Load the result at `result_location` and the frame, then compose.
    /// Returns PNG bytes.
    pub async fn compose(&self, result_location: &str) -> Result<Vec<u8>, ComposeError> {
        let (result_bytes, frame_bytes) = tokio::try_join!(
            self.result_source.load(result_location),
            self.frame_source.load(&self.frame_location),
        )?;

        tracing::debug!(
            result_size = result_bytes.len(),
            frame_size = frame_bytes.len(),
            "Composition inputs loaded",
        );

        let layout = self.layout;
        let composed = tokio::task::spawn_blocking(move || {
            compose_encoded(&result_bytes, &frame_bytes, &layout)
        })
        .await
        .map_err(|e| ComposeError::Task(e.to_string()))??;

        Ok(composed)
    }
}
