//! Lifecycle events
//!
//! Stages report to the orchestrator through an [`EventSink`] (fire and
//! forget, no reply channel). The orchestrator republishes what shells care
//! about on the [`EventBus`], a lagging broadcast: slow subscribers miss
//! events instead of stalling the pipeline.

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use crate::classify::{Emotion, Language};
use crate::session::{SessionId, SessionState, Transcript};
use crate::voice::RecognitionErrorKind;

/// Broadcast buffer per subscriber
const BUS_CAPACITY: usize = 64;

/// How a wake was triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WakeSource {
    /// Wake phrase detector
    Detector,
    /// UI affordance, API call or console
    Manual,
}

/// A lifecycle notification
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Owning session; `None` only for a wake that has not opened one yet
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    #[must_use]
    pub const fn new(session_id: SessionId, kind: EventKind) -> Self {
        Self {
            session_id: Some(session_id),
            kind,
        }
    }

    /// Short name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Event payloads
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum EventKind {
    WakeDetected {
        source: WakeSource,
    },
    ListeningStarted,
    PartialTranscript {
        text: String,
    },
    TranscriptFinal {
        transcript: Transcript,
    },
    RecognitionError {
        kind: RecognitionErrorKind,
    },
    /// Microphone level in dBFS
    AudioLevel {
        rms_db: f32,
    },
    SpeechRecognized {
        text: String,
        language: Language,
        emotion: Emotion,
    },
    /// Backend failure absorbed by the generator (informational)
    AiError {
        message: String,
    },
    AiResponseReady {
        response: String,
        is_fallback: bool,
    },
    TtsStarted,
    TtsDone,
    TtsError {
        message: String,
    },
    SessionEnded {
        state: SessionState,
    },
}

impl EventKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WakeDetected { .. } => "wake-detected",
            Self::ListeningStarted => "listening-started",
            Self::PartialTranscript { .. } => "partial-transcript",
            Self::TranscriptFinal { .. } => "transcript-final",
            Self::RecognitionError { .. } => "recognition-error",
            Self::AudioLevel { .. } => "audio-level",
            Self::SpeechRecognized { .. } => "speech-recognized",
            Self::AiError { .. } => "ai-error",
            Self::AiResponseReady { .. } => "ai-response-ready",
            Self::TtsStarted => "tts-started",
            Self::TtsDone => "tts-done",
            Self::TtsError { .. } => "tts-error",
            Self::SessionEnded { .. } => "session-ended",
        }
    }
}

/// Sending half of the orchestrator inbox
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSink {
    /// Create a sink and the inbox it feeds
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Report a stage event for `session_id`
    pub fn emit(&self, session_id: SessionId, kind: EventKind) {
        self.send(Event::new(session_id, kind));
    }

    /// Report a wake trigger
    pub fn wake(&self, source: WakeSource) {
        self.send(Event {
            session_id: None,
            kind: EventKind::WakeDetected { source },
        });
    }

    fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::trace!("orchestrator inbox closed, event dropped");
        }
    }
}

/// Upward event fan-out for shells and API clients
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// Publish to every current subscriber; no subscribers is fine
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }

    /// Subscribe to upward events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_tagged() {
        let id = SessionId::new();
        let event = Event::new(
            id,
            EventKind::RecognitionError {
                kind: RecognitionErrorKind::SpeechTimeout,
            },
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "recognition-error");
        assert_eq!(json["kind"], "speech-timeout");
        assert_eq!(json["session_id"], id.to_string());
    }

    #[test]
    fn test_wake_has_no_session() {
        let (sink, mut rx) = EventSink::channel();
        sink.wake(WakeSource::Manual);

        let event = rx.try_recv().unwrap();
        assert!(event.session_id.is_none());
        assert_eq!(event.name(), "wake-detected");
    }

    #[test]
    fn test_sink_survives_closed_inbox() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        sink.emit(SessionId::new(), EventKind::TtsDone);
    }

    #[tokio::test]
    async fn test_bus_fan_out() {
        let bus = EventBus::new();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.publish(Event::new(SessionId::new(), EventKind::ListeningStarted));

        assert_eq!(a.recv().await.unwrap().name(), "listening-started");
        assert_eq!(b.recv().await.unwrap().name(), "listening-started");
    }
}
