//! Session orchestrator
//!
//! A single task owns the active [`Session`] and advances it on stage events:
//!
//! ```text
//! Idle ─wake─▶ Listening ─partial─▶ Transcribing
//!                 │                     │
//!                 └──── final ──────────┴─▶ Classifying ─▶ Generating ─ai-response─▶ Speaking
//!                 │                                                                   │
//!      recognition-error ─▶ Error                                tts-done ─▶ Done / tts-error ─▶ Error
//! ```
//!
//! `Done` and `Error` discard the session and return to `Idle`. At most one
//! session is open; wakes that arrive meanwhile are dropped. Events for any
//! other session id are ignored.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};

use crate::classify::{Emotion, EmotionClassifier, Language, LanguageClassifier};
use crate::events::{Event, EventBus, EventKind, EventSink, WakeSource};
use crate::response::ResponseGenerator;
use crate::session::{Session, SessionId, SessionState, Transcript};
use crate::voice::{SpeechCaptureStage, SpeechSynthesisStage, SynthesisRequest};

/// Owns session lifecycle and routes stage events
pub struct SessionOrchestrator {
    capture: SpeechCaptureStage,
    synthesis: SpeechSynthesisStage,
    generator: Arc<ResponseGenerator>,
    bus: EventBus,
    sink: EventSink,
    inbox: mpsc::UnboundedReceiver<Event>,
    state: watch::Sender<SessionState>,
    session: Option<Session>,
}

impl SessionOrchestrator {
    #[must_use]
    pub fn new(
        capture: SpeechCaptureStage,
        synthesis: SpeechSynthesisStage,
        generator: ResponseGenerator,
        bus: EventBus,
    ) -> Self {
        let (sink, inbox) = EventSink::channel();
        let (state, _) = watch::channel(SessionState::Idle);

        Self {
            capture,
            synthesis,
            generator: Arc::new(generator),
            bus,
            sink,
            inbox,
            state,
            session: None,
        }
    }

    /// Sink for wake triggers and external stages
    #[must_use]
    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    /// Watch the current state
    #[must_use]
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Process events until `shutdown` resolves
    pub async fn run(mut self, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        tracing::info!("orchestrator running");

        loop {
            let event = tokio::select! {
                () = &mut shutdown => break,
                event = self.inbox.recv() => event,
            };
            let Some(event) = event else { break };
            self.handle_event(event);
        }

        if let Some(session) = &self.session {
            tracing::info!(session_id = %session.id, state = %session.state, "abandoning session on shutdown");
        }
        tracing::info!("orchestrator stopped");
    }

    /// Apply one event to the state machine
    pub fn handle_event(&mut self, event: Event) {
        if let EventKind::WakeDetected { source } = event.kind {
            self.on_wake(source);
            return;
        }

        let Some(session) = &self.session else {
            tracing::debug!(event = event.name(), "no active session, event ignored");
            return;
        };
        let (id, state) = (session.id, session.state);

        if event.session_id != Some(id) {
            tracing::debug!(
                event = event.name(),
                session_id = ?event.session_id,
                active = %id,
                "stale session, event ignored"
            );
            return;
        }

        let name = event.name();
        match (state, event.kind) {
            (
                SessionState::Listening | SessionState::Transcribing,
                kind @ (EventKind::ListeningStarted | EventKind::AudioLevel { .. }),
            ) => self.publish(id, kind),
            (SessionState::Listening | SessionState::Transcribing, EventKind::PartialTranscript { text }) => {
                if state == SessionState::Listening {
                    self.set_state(SessionState::Transcribing);
                }
                self.publish(id, EventKind::PartialTranscript { text });
            }
            (SessionState::Listening | SessionState::Transcribing, EventKind::TranscriptFinal { transcript }) => {
                self.on_transcript(id, transcript);
            }
            (SessionState::Listening | SessionState::Transcribing, EventKind::RecognitionError { kind }) => {
                tracing::info!(session_id = %id, %kind, "recognition failed");
                self.publish(id, EventKind::RecognitionError { kind });
                self.end(SessionState::Error);
            }
            (SessionState::Generating, kind @ EventKind::AiError { .. }) => self.publish(id, kind),
            (SessionState::Generating, EventKind::AiResponseReady { response, is_fallback }) => {
                self.on_response(id, response, is_fallback);
            }
            (SessionState::Speaking, EventKind::TtsStarted) => {
                self.publish(id, EventKind::TtsStarted);
            }
            (SessionState::Speaking, EventKind::TtsDone) => {
                self.publish(id, EventKind::TtsDone);
                self.end(SessionState::Done);
            }
            (SessionState::Speaking, EventKind::TtsError { message }) => {
                tracing::warn!(session_id = %id, %message, "synthesis failed");
                self.publish(id, EventKind::TtsError { message });
                self.end(SessionState::Error);
            }
            (state, _) => {
                tracing::debug!(event = name, %state, "unexpected for state, event ignored");
            }
        }
    }

    fn on_wake(&mut self, source: WakeSource) {
        if let Some(active) = &self.session {
            tracing::debug!(
                ?source,
                session_id = %active.id,
                state = %active.state,
                "session in progress, wake dropped"
            );
            return;
        }

        let session = Session::open();
        let id = session.id;
        tracing::info!(session_id = %id, ?source, "session opened");

        self.session = Some(session);
        self.state.send_replace(SessionState::Listening);
        self.publish(id, EventKind::WakeDetected { source });
        self.capture.start(id, self.sink.clone());
    }

    fn on_transcript(&mut self, id: SessionId, transcript: Transcript) {
        self.set_state(SessionState::Classifying);

        let text = transcript.text.clone();
        let language = LanguageClassifier::classify(&text).value;
        let emotion = EmotionClassifier::classify(&text).value;

        tracing::info!(
            session_id = %id,
            %language,
            %emotion,
            locale_hint = transcript.language.as_deref().unwrap_or("-"),
            "transcript classified"
        );

        if let Some(session) = self.session.as_mut() {
            session.transcript = Some(text.clone());
            session.language = Some(language);
            session.emotion = Some(emotion);
        }

        self.publish(id, EventKind::TranscriptFinal { transcript });
        self.publish(
            id,
            EventKind::SpeechRecognized {
                text: text.clone(),
                language,
                emotion,
            },
        );

        self.set_state(SessionState::Generating);
        self.spawn_generation(id, language, emotion, text);
    }

    fn spawn_generation(&self, id: SessionId, language: Language, emotion: Emotion, text: String) {
        let generator = Arc::clone(&self.generator);
        let sink = self.sink.clone();

        tokio::spawn(async move {
            let result = generator.generate(language, emotion, &text).await;
            if let Some(message) = result.fallback_reason {
                sink.emit(id, EventKind::AiError { message });
            }
            sink.emit(
                id,
                EventKind::AiResponseReady {
                    response: result.text,
                    is_fallback: result.is_fallback,
                },
            );
        });
    }

    fn on_response(&mut self, id: SessionId, response: String, is_fallback: bool) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.response = Some(response.clone());
        session.is_fallback = is_fallback;

        let request = SynthesisRequest {
            text: response.clone(),
            language: session.language.unwrap_or(Language::Unknown),
            emotion: session.emotion.unwrap_or(Emotion::Neutral),
        };

        self.set_state(SessionState::Speaking);
        self.publish(
            id,
            EventKind::AiResponseReady {
                response,
                is_fallback,
            },
        );
        self.synthesis.speak(id, &request, self.sink.clone());
    }

    /// Discard the session and return to `Idle`
    fn end(&mut self, state: SessionState) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        session.state = state;

        let elapsed_ms = (Utc::now() - session.created_at).num_milliseconds();
        tracing::info!(
            session_id = %session.id,
            %state,
            fallback = session.is_fallback,
            elapsed_ms,
            "session ended"
        );

        self.state.send_replace(SessionState::Idle);
        self.publish(session.id, EventKind::SessionEnded { state });
    }

    fn set_state(&mut self, state: SessionState) {
        if let Some(session) = self.session.as_mut() {
            tracing::trace!(session_id = %session.id, from = %session.state, to = %state, "transition");
            session.state = state;
        }
        self.state.send_replace(state);
    }

    fn publish(&self, id: SessionId, kind: EventKind) {
        self.bus.publish(Event::new(id, kind));
    }
}
