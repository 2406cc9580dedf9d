//! Sahayak - wake-word voice assistant pipeline
//!
//! A spoken wake phrase opens a session, the transcript is classified by
//! language (Hindi, English, Hinglish) and emotional tone, a reply is
//! generated for that mood and spoken back with matching prosody.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              Shells (console, HTTP, WebSocket)        │
//! └─────────────────────────┬────────────────────────────┘
//!                           │ wake / upward events
//! ┌─────────────────────────▼────────────────────────────┐
//! │                 SessionOrchestrator                   │
//! │  Wake │ Capture │ Classify │ Generate │ Synthesize    │
//! └─────────────────────────┬────────────────────────────┘
//!                           │
//! ┌─────────────────────────▼────────────────────────────┐
//! │  Platform capabilities      │  Completion backend     │
//! │  (recogniser, TTS, wake)    │  (OpenAI-compatible)    │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod classify;
pub mod config;
pub mod daemon;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod preferences;
pub mod response;
pub mod session;
pub mod voice;

pub use classify::{ClassificationResult, Emotion, EmotionClassifier, Language, LanguageClassifier};
pub use config::Config;
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use events::{Event, EventBus, EventKind, EventSink, WakeSource};
pub use orchestrator::SessionOrchestrator;
pub use preferences::{PreferenceStore, Preferences};
pub use response::{ResponseGenerator, ResponseResult};
pub use session::{Session, SessionId, SessionState, Transcript};
