use faceframe_core::config::{env_or, parse_env_or};
use faceframe_core::error::CoreError;

/// Default request ceiling. Must stay above the polling worst case
/// (3 s x 60 attempts) plus upload and compose time.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Default multipart body limit for the captured photo.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub max_upload_bytes: usize,
    /// Decorative frame drawn over every result.
    pub frame_image_path: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `HOST`                 | `0.0.0.0`                |
    /// | `PORT`                 | `3000`                   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS` | `300`                    |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`               |
    /// | `FRAME_IMAGE_PATH`     | `assets/outputframe.png` |
    pub fn from_env() -> Result<Self, CoreError> {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env_or("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: parse_env_or(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?,
            max_upload_bytes: parse_env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            frame_image_path: env_or("FRAME_IMAGE_PATH", "assets/outputframe.png"),
        })
    }
}
