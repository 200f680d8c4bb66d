//! The session value threaded through every pipeline step.
//!
//! A [`Session`] is created once at capture time and never mutated in
//! place. Each step that learns something new (an uploaded URL, the
//! worker's output, the framed artifact) returns an updated copy via the
//! `with_*` methods, so no two steps share mutable state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Default event tag stored with every record.
pub const DEFAULT_EVENT_ID: &str = "default-event";

/// Default user tag for anonymous kiosk visitors.
pub const DEFAULT_USER_ID: &str = "guest";

/// Credits charged per transformation.
pub const DEFAULT_CREDITS_USED: &str = "1";

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Opaque unique token identifying one end-to-end run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> uuid::Uuid {
        self.0
    }
}

impl From<uuid::Uuid> for SessionId {
    fn from(value: uuid::Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for SessionId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| CoreError::Validation(format!("Invalid session id '{s}': {e}")))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

/// Which reference-image folder the visitor picked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Folder / column value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(CoreError::Validation(format!(
                "Unknown gender '{other}'. Must be one of: male, female"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Attribution
// ---------------------------------------------------------------------------

/// Who and what event a session is billed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub event_id: String,
    pub user_id: String,
    pub credits_used: String,
}

impl Default for Attribution {
    fn default() -> Self {
        Self {
            user_name: None,
            user_email: None,
            event_id: DEFAULT_EVENT_ID.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
            credits_used: DEFAULT_CREDITS_USED.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One end-to-end run of the pipeline for a single captured photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    session_id: SessionId,
    gender: Gender,
    target_image_url: String,
    attribution: Attribution,
    source_image_url: Option<String>,
    output_url: Option<String>,
    composed_output_url: Option<String>,
}

impl Session {
    /// Start a session for the chosen reference image.
    ///
    /// Fails if `target_image_url` is blank.
    pub fn new(
        gender: Gender,
        target_image_url: impl Into<String>,
        attribution: Attribution,
    ) -> Result<Self, CoreError> {
        Self::with_id(SessionId::generate(), gender, target_image_url, attribution)
    }

    /// Same as [`Session::new`] but with a caller-supplied identifier.
    pub fn with_id(
        session_id: SessionId,
        gender: Gender,
        target_image_url: impl Into<String>,
        attribution: Attribution,
    ) -> Result<Self, CoreError> {
        let target_image_url = target_image_url.into();
        if target_image_url.trim().is_empty() {
            return Err(CoreError::Validation(
                "target image url must not be empty".into(),
            ));
        }
        Ok(Self {
            session_id,
            gender,
            target_image_url,
            attribution,
            source_image_url: None,
            output_url: None,
            composed_output_url: None,
        })
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn target_image_url(&self) -> &str {
        &self.target_image_url
    }

    pub fn attribution(&self) -> &Attribution {
        &self.attribution
    }

    pub fn source_image_url(&self) -> Option<&str> {
        self.source_image_url.as_deref()
    }

    pub fn output_url(&self) -> Option<&str> {
        self.output_url.as_deref()
    }

    pub fn composed_output_url(&self) -> Option<&str> {
        self.composed_output_url.as_deref()
    }

    /// Record the uploaded capture. The source URL is set once; a second
    /// call keeps the first value.
    pub fn with_source_image_url(self, url: impl Into<String>) -> Self {
        if self.source_image_url.is_some() {
            return self;
        }
        Self {
            source_image_url: Some(url.into()),
            ..self
        }
    }

    /// Record the worker's raw output. Blank values are ignored so the
    /// field never regresses to absent.
    pub fn with_output_url(self, url: impl Into<String>) -> Self {
        let url = url.into();
        if url.trim().is_empty() || self.output_url.is_some() {
            return self;
        }
        Self {
            output_url: Some(url),
            ..self
        }
    }

    /// Record the framed artifact.
    ///
    /// Only a session that already holds a raw output can carry a
    /// composed output.
    pub fn with_composed_output_url(self, url: impl Into<String>) -> Result<Self, CoreError> {
        if self.output_url.is_none() {
            return Err(CoreError::Validation(format!(
                "session {} has no raw output to derive a composed output from",
                self.session_id
            )));
        }
        if self.composed_output_url.is_some() {
            return Err(CoreError::Validation(format!(
                "session {} already has a composed output",
                self.session_id
            )));
        }
        Ok(Self {
            composed_output_url: Some(url.into()),
            ..self
        })
    }
}

// ---------------------------------------------------------------------------
// Record store columns
// ---------------------------------------------------------------------------

/// Mutable columns of the session record that callers may read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    /// Raw result URL, written by the remote worker and later overwritten
    /// with the framed artifact.
    Output,
    /// The chosen reference image URL.
    CharacterImage,
}

impl SessionField {
    /// Database column name.
    pub fn column(self) -> &'static str {
        match self {
            Self::Output => "output",
            Self::CharacterImage => "character_image",
        }
    }
}

/// The row written when a session is first persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub image_url: String,
    pub gender: Gender,
    pub character_image: String,
    pub attribution: Attribution,
}

impl SessionRecord {
    /// Build the initial row from a session whose capture is uploaded.
    pub fn from_session(session: &Session) -> Result<Self, CoreError> {
        let image_url = session.source_image_url().ok_or_else(|| {
            CoreError::Validation(format!(
                "session {} has no uploaded source image",
                session.session_id()
            ))
        })?;
        Ok(Self {
            session_id: session.session_id(),
            image_url: image_url.to_string(),
            gender: session.gender(),
            character_image: session.target_image_url().to_string(),
            attribution: session.attribution().clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
