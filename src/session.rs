//! Session data model
//!
//! A [`Session`] is one wake-to-speak cycle. Only the orchestrator holds one;
//! stages receive the individual fields they need.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::{Emotion, Language};

/// Unique session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Orchestrator state
///
/// `Idle`, `Done` and `Error` are all quiescent: a new wake is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Listening,
    Transcribing,
    Classifying,
    Generating,
    Speaking,
    Done,
    Error,
}

impl SessionState {
    /// Whether a new session may start from this state
    #[must_use]
    pub const fn is_quiescent(self) -> bool {
        matches!(self, Self::Idle | Self::Done | Self::Error)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Listening => "listening",
            Self::Transcribing => "transcribing",
            Self::Classifying => "classifying",
            Self::Generating => "generating",
            Self::Speaking => "speaking",
            Self::Done => "done",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognised text from the capture stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub is_partial: bool,
    /// Recogniser locale hint, when the capability reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Transcript {
    /// A final transcript with no locale hint
    #[must_use]
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_partial: false,
            language: None,
        }
    }
}

/// One wake-to-speak interaction
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub state: SessionState,
    pub language: Option<Language>,
    pub emotion: Option<Emotion>,
    pub transcript: Option<String>,
    pub response: Option<String>,
    pub is_fallback: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Open a session in `Listening`
    #[must_use]
    pub fn open() -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Listening,
            language: None,
            emotion: None,
            transcript: None,
            response: None,
            is_fallback: false,
            created_at: Utc::now(),
        }
    }
}
