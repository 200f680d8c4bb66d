//! Upload key naming convention.
//!
//! Keys embed a purpose prefix, the session id, a millisecond timestamp,
//! and an extension: `{prefix}{session_id}_{unix_millis}{ext}`.

use crate::session::SessionId;
use crate::types::Timestamp;

/// What an uploaded asset is, which fixes its key prefix and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// The raw captured photo.
    Capture,
    /// The composited, framed result.
    Framed,
}

impl AssetKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Capture => "user_",
            Self::Framed => "framed_",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Capture => ".jpg",
            Self::Framed => ".png",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Capture => "image/jpeg",
            Self::Framed => "image/png",
        }
    }
}

/// Build the storage key for an asset.
///
/// # Examples
///
/// ```
/// use chrono::TimeZone;
/// use faceframe_core::naming::{upload_key, AssetKind};
/// use faceframe_core::session::SessionId;
///
/// let id: SessionId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
/// let at = chrono::Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
/// assert_eq!(
///     upload_key(AssetKind::Framed, id, at),
///     "framed_67e55044-10b1-426f-9247-bb680e5fe0c8_1700000000123.png"
/// );
/// ```
pub fn upload_key(kind: AssetKind, session_id: SessionId, at: Timestamp) -> String {
    format!(
        "{}{}_{}{}",
        kind.prefix(),
        session_id,
        at.timestamp_millis(),
        kind.extension()
    )
}
