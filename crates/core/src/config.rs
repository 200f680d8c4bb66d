//! Configuration shared by the pollers and the compositor, plus the
//! environment-variable helpers every crate uses to load its settings.

use std::time::Duration;

use crate::compositor::{CornerStyle, FrameLayout};
use crate::error::CoreError;

/// Default delay between polling attempts.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;

/// Default attempt budget for both pollers.
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 60;

// ---------------------------------------------------------------------------
// Environment helpers
// ---------------------------------------------------------------------------

/// Read a required, non-blank environment variable.
pub fn require_env(key: &'static str) -> Result<String, CoreError> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(CoreError::MissingConfig(key)),
    }
}

/// Read an environment variable, falling back to `default` when unset.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read and parse an environment variable, falling back to `default`.
pub fn parse_env_or<T>(key: &str, default: T) -> Result<T, CoreError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| CoreError::Validation(format!("{key} is invalid ('{raw}'): {e}"))),
        Err(_) => Ok(default),
    }
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// Fixed interval and attempt budget shared by the job-status poller and
/// the result poller. There is no backoff: worst-case latency is
/// `interval * max_attempts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
        }
    }
}

impl PollingConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Result<Self, CoreError> {
        if max_attempts == 0 {
            return Err(CoreError::Validation(
                "polling max attempts must be at least 1".into(),
            ));
        }
        Ok(Self {
            interval,
            max_attempts,
        })
    }

    /// Load from the environment.
    ///
    /// | Env Var             | Default |
    /// |---------------------|---------|
    /// | `POLL_INTERVAL_MS`  | `3000`  |
    /// | `POLL_MAX_ATTEMPTS` | `60`    |
    pub fn from_env() -> Result<Self, CoreError> {
        let interval_ms = parse_env_or("POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        let max_attempts = parse_env_or("POLL_MAX_ATTEMPTS", DEFAULT_POLL_MAX_ATTEMPTS)?;
        Self::new(Duration::from_millis(interval_ms), max_attempts)
    }

    /// Upper bound on time spent polling.
    pub fn worst_case(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

// ---------------------------------------------------------------------------
// Frame layout
// ---------------------------------------------------------------------------

/// Load the compositor layout policy from the environment.
///
/// | Env Var               | Default  |
/// |-----------------------|----------|
/// | `FRAME_LAYOUT`        | `fixed`  |
/// | `FRAME_TARGET_WIDTH`  | `1150`   |
/// | `FRAME_TARGET_HEIGHT` | `1650`   |
/// | `FRAME_CORNER_RADIUS` | `120`    |
/// | `FRAME_CORNERS`       | `left`   |
/// | `FRAME_SCALE`         | `0.9`    |
/// | `FRAME_OFFSET_Y`      | `0`      |
pub fn frame_layout_from_env() -> Result<FrameLayout, CoreError> {
    let layout = env_or("FRAME_LAYOUT", "fixed");
    match layout.trim() {
        "fixed" => {
            let corners = match env_or("FRAME_CORNERS", "left").trim() {
                "left" => CornerStyle::Left,
                "all" => CornerStyle::All,
                other => {
                    return Err(CoreError::Validation(format!(
                        "FRAME_CORNERS must be 'left' or 'all', got '{other}'"
                    )))
                }
            };
            Ok(FrameLayout::FixedSizeCentered {
                width: parse_env_or("FRAME_TARGET_WIDTH", 1150)?,
                height: parse_env_or("FRAME_TARGET_HEIGHT", 1650)?,
                corner_radius: parse_env_or("FRAME_CORNER_RADIUS", 120)?,
                corners,
            })
        }
        "scaled" => {
            let scale: f32 = parse_env_or("FRAME_SCALE", 0.9)?;
            if !(scale.is_finite() && scale > 0.0) {
                return Err(CoreError::Validation(format!(
                    "FRAME_SCALE must be positive, got {scale}"
                )));
            }
            Ok(FrameLayout::ScaledWithOffset {
                scale,
                offset_y: parse_env_or("FRAME_OFFSET_Y", 0)?,
            })
        }
        other => Err(CoreError::Validation(format!(
            "FRAME_LAYOUT must be 'fixed' or 'scaled', got '{other}'"
        ))),
    }
}
