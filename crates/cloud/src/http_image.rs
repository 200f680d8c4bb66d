//! Fetch image bytes over HTTP(S).

use std::time::Duration;

use async_trait::async_trait;
use faceframe_core::error::CoreError;
use faceframe_core::services::{ImageLoadError, ImageSource};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// [`ImageSource`] that treats the location as a URL.
pub struct HttpImageSource {
    client: reqwest::Client,
}

impl HttpImageSource {
    pub fn new() -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn load(&self, location: &str) -> Result<Vec<u8>, ImageLoadError> {
        let unavailable = |reason: String| ImageLoadError::Unavailable {
            location: location.to_string(),
            reason,
        };

        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        if bytes.is_empty() {
            return Err(unavailable("empty body".into()));
        }
        Ok(bytes.to_vec())
    }
}
