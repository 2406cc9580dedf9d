//! Voice stages and the platform capabilities behind them
//!
//! Audio capture, speech recognition, synthesis and wake detection are
//! external collaborators reached through the narrow traits below. The
//! stages drive them and report back to the orchestrator as events.

mod capture;
mod console;
pub mod profile;
mod synthesis;
mod wake_word;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use capture::SpeechCaptureStage;
pub use console::{ConsoleCapture, ConsoleIo, ConsoleSynthesizer, ConsoleWake};
pub use profile::{Prosody, locale_for, prosody_for, prosody_for_tag};
pub use synthesis::{SpeechSynthesisStage, SynthesisRequest};
pub use wake_word::{WakePhrase, WakeTrigger};

/// Speech recognition failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionErrorKind {
    AudioError,
    ClientError,
    InsufficientPermissions,
    NetworkError,
    NetworkTimeout,
    NoMatch,
    RecognizerBusy,
    ServerError,
    SpeechTimeout,
    Unknown,
}

impl RecognitionErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AudioError => "audio-error",
            Self::ClientError => "client-error",
            Self::InsufficientPermissions => "insufficient-permissions",
            Self::NetworkError => "network-error",
            Self::NetworkTimeout => "network-timeout",
            Self::NoMatch => "no-match",
            Self::RecognizerBusy => "recognizer-busy",
            Self::ServerError => "server-error",
            Self::SpeechTimeout => "speech-timeout",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw recogniser output
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    Partial(String),
    /// Recognised utterance, with the locale the recogniser settled on if it reports one
    Final {
        text: String,
        locale: Option<String>,
    },
    Error(RecognitionErrorKind),
    /// Input level in dBFS
    AudioLevel(f32),
}

impl RecognitionEvent {
    /// A final result with no locale hint
    #[must_use]
    pub fn final_text(text: impl Into<String>) -> Self {
        Self::Final {
            text: text.into(),
            locale: None,
        }
    }
}

/// Platform speech recognition
#[async_trait]
pub trait CaptureCapability: Send + Sync {
    /// Open a recognition stream for the candidate locales, primary first
    ///
    /// # Errors
    ///
    /// Returns the error kind if the recogniser cannot start
    async fn start_listening(
        &self,
        locales: &[String],
    ) -> std::result::Result<BoxStream<'static, RecognitionEvent>, RecognitionErrorKind>;
}

/// One utterance handed to the synthesiser
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub locale: String,
    pub rate: f32,
    pub pitch: f32,
}

/// Synthesiser lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisEvent {
    Started,
    Done,
    Error(String),
}

/// Platform text-to-speech
#[async_trait]
pub trait SynthesisCapability: Send + Sync {
    /// Whether voice data for `locale` is available
    fn supports_locale(&self, locale: &str) -> bool;

    /// Speak an utterance
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot start at all
    async fn speak(&self, utterance: Utterance) -> Result<BoxStream<'static, SynthesisEvent>>;

    /// Stop whatever is playing
    async fn stop(&self);
}

/// Called by a wake capability on every detection
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// Platform wake phrase detector
#[async_trait]
pub trait WakeCapability: Send + Sync {
    /// Start detecting, invoking `on_trigger` on each detection
    ///
    /// # Errors
    ///
    /// Returns error if the detector cannot be initialised
    async fn start(&self, on_trigger: WakeCallback) -> Result<()>;

    /// Stop detecting
    async fn stop(&self);
}
