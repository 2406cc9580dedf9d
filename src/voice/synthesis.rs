//! Speech synthesis stage
//!
//! Resolves locale and prosody, drives the synthesiser and guarantees one
//! `tts-started` plus one terminal event per request. A new request flushes
//! any utterance still playing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::StreamExt;
use tokio::task::JoinHandle;

use super::profile::{DEFAULT_LOCALE, locale_for, prosody_for};
use super::{SynthesisCapability, SynthesisEvent, Utterance};
use crate::classify::{Emotion, Language};
use crate::events::{EventKind, EventSink};
use crate::session::SessionId;

/// What to say and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub language: Language,
    pub emotion: Emotion,
}

/// Which lifecycle events an utterance has emitted
#[derive(Default)]
struct Progress {
    started: AtomicBool,
    /// Set by whoever emits the terminal event: the utterance task or a flush
    finished: AtomicBool,
}

impl Progress {
    /// Claim the terminal event; true for exactly one caller
    fn claim_terminal(&self) -> bool {
        !self.finished.swap(true, Ordering::SeqCst)
    }
}

/// The utterance currently owned by the stage
struct InFlight {
    session_id: SessionId,
    progress: Arc<Progress>,
    handle: JoinHandle<()>,
}

/// Drives a [`SynthesisCapability`]
pub struct SpeechSynthesisStage {
    capability: Arc<dyn SynthesisCapability>,
    current: Mutex<Option<InFlight>>,
}

impl SpeechSynthesisStage {
    #[must_use]
    pub fn new(capability: Arc<dyn SynthesisCapability>) -> Self {
        Self {
            capability,
            current: Mutex::new(None),
        }
    }

    /// Map a request to a concrete utterance
    #[must_use]
    pub fn utterance_for(&self, request: &SynthesisRequest) -> Utterance {
        let wanted = locale_for(request.language);
        let locale = if self.capability.supports_locale(wanted) {
            wanted
        } else {
            tracing::warn!(locale = wanted, "voice data missing, using default locale");
            DEFAULT_LOCALE
        };

        let prosody = prosody_for(request.emotion);
        Utterance {
            text: request.text.clone(),
            locale: locale.to_string(),
            rate: prosody.rate,
            pitch: prosody.pitch,
        }
    }

    /// Speak `request` for `session_id` in the background
    pub fn speak(&self, session_id: SessionId, request: &SynthesisRequest, sink: EventSink) {
        let flushed = self.flush(&sink);
        let utterance = self.utterance_for(request);

        tracing::debug!(
            %session_id,
            locale = %utterance.locale,
            rate = utterance.rate,
            pitch = utterance.pitch,
            "speaking"
        );

        let progress = Arc::new(Progress::default());
        let capability = Arc::clone(&self.capability);
        let task_progress = Arc::clone(&progress);

        let handle = tokio::spawn(async move {
            if flushed {
                capability.stop().await;
            }
            let terminal = drive(&*capability, utterance, session_id, &sink, &task_progress).await;
            ensure_started(session_id, &sink, &task_progress);
            if task_progress.claim_terminal() {
                sink.emit(session_id, terminal);
            }
        });

        *self.lock() = Some(InFlight {
            session_id,
            progress,
            handle,
        });
    }

    /// Cancel the unfinished utterance, if any; returns whether one was cut off
    fn flush(&self, sink: &EventSink) -> bool {
        let Some(prior) = self.lock().take() else {
            return false;
        };
        // The task may have emitted its terminal event without having returned yet
        if !prior.progress.claim_terminal() {
            return false;
        }

        prior.handle.abort();
        tracing::info!(session_id = %prior.session_id, "flushing unfinished utterance");
        ensure_started(prior.session_id, sink, &prior.progress);
        sink.emit(
            prior.session_id,
            EventKind::TtsError {
                message: "flushed by a newer utterance".to_string(),
            },
        );
        true
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<InFlight>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Play one utterance; returns its terminal event
///
/// An engine that refuses a non-default locale gets one more try in
/// [`DEFAULT_LOCALE`]. Only a refusal of the default voice is terminal.
async fn drive(
    capability: &dyn SynthesisCapability,
    utterance: Utterance,
    session_id: SessionId,
    sink: &EventSink,
    progress: &Progress,
) -> EventKind {
    let retry = (utterance.locale != DEFAULT_LOCALE).then(|| Utterance {
        locale: DEFAULT_LOCALE.to_string(),
        ..utterance.clone()
    });

    let mut events = match capability.speak(utterance).await {
        Ok(events) => events,
        Err(e) => {
            let Some(retry) = retry else {
                tracing::error!(%session_id, error = %e, "synthesiser failed to start");
                return EventKind::TtsError {
                    message: e.to_string(),
                };
            };

            tracing::warn!(%session_id, error = %e, "voice unavailable, retrying in default locale");
            match capability.speak(retry).await {
                Ok(events) => events,
                Err(e) => {
                    tracing::error!(%session_id, error = %e, "synthesiser failed to start");
                    return EventKind::TtsError {
                        message: e.to_string(),
                    };
                }
            }
        }
    };

    while let Some(event) = events.next().await {
        match event {
            SynthesisEvent::Started => ensure_started(session_id, sink, progress),
            SynthesisEvent::Done => return EventKind::TtsDone,
            SynthesisEvent::Error(message) => return EventKind::TtsError { message },
        }
    }

    EventKind::TtsError {
        message: "synthesis ended without completing".to_string(),
    }
}

/// Emit `tts-started` unless it already went out
fn ensure_started(session_id: SessionId, sink: &EventSink, progress: &Progress) {
    if !progress.started.swap(true, Ordering::SeqCst) {
        sink.emit(session_id, EventKind::TtsStarted);
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use futures::stream::{self, BoxStream};

    use super::*;
    use crate::events::Event;

    struct Engine {
        script: Vec<SynthesisEvent>,
        hang: bool,
        locales: &'static [&'static str],
    }

    #[async_trait]
    impl SynthesisCapability for Engine {
        fn supports_locale(&self, locale: &str) -> bool {
            self.locales.contains(&locale)
        }

        async fn speak(
            &self,
            _utterance: Utterance,
        ) -> crate::Result<BoxStream<'static, SynthesisEvent>> {
            let events = stream::iter(self.script.clone());
            if self.hang {
                Ok(events.chain(stream::pending()).boxed())
            } else {
                Ok(events.boxed())
            }
        }

        async fn stop(&self) {}
    }

    fn stage(script: Vec<SynthesisEvent>, hang: bool) -> SpeechSynthesisStage {
        SpeechSynthesisStage::new(Arc::new(Engine {
            script,
            hang,
            locales: &["en-US", "hi-IN"],
        }))
    }

    fn request(language: Language, emotion: Emotion) -> SynthesisRequest {
        SynthesisRequest {
            text: "theek hai".to_string(),
            language,
            emotion,
        }
    }

    async fn collect(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Event>, n: usize) -> Vec<Event> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.push(rx.recv().await.unwrap());
        }
        events
    }

    #[test]
    fn test_missing_locale_falls_back() {
        let stage = stage(vec![], false);
        let utterance = stage.utterance_for(&request(Language::Hinglish, Emotion::Sad));

        assert_eq!(utterance.locale, DEFAULT_LOCALE);
        assert!((utterance.rate - 0.8).abs() < f32::EPSILON);
        assert!((utterance.pitch - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_supported_locale_kept() {
        let stage = stage(vec![], false);
        let utterance = stage.utterance_for(&request(Language::Hindi, Emotion::Neutral));
        assert_eq!(utterance.locale, "hi-IN");
    }

    #[tokio::test]
    async fn test_started_then_done() {
        let stage = stage(vec![SynthesisEvent::Started, SynthesisEvent::Done], false);
        let (sink, mut rx) = EventSink::channel();

        stage.speak(SessionId::new(), &request(Language::English, Emotion::Happy), sink);

        let events = collect(&mut rx, 2).await;
        assert_eq!(events[0].name(), "tts-started");
        assert_eq!(events[1].name(), "tts-done");
    }

    #[tokio::test]
    async fn test_missing_started_is_synthesised() {
        let stage = stage(vec![SynthesisEvent::Error("engine gone".into())], false);
        let (sink, mut rx) = EventSink::channel();

        stage.speak(SessionId::new(), &request(Language::English, Emotion::Happy), sink);

        let events = collect(&mut rx, 2).await;
        assert_eq!(events[0].name(), "tts-started");
        assert_eq!(events[1].name(), "tts-error");
    }

    /// Engine whose voices for some locales fail to load
    struct PartialVoices {
        broken: &'static [&'static str],
        tried: std::sync::Mutex<Vec<String>>,
    }

    impl PartialVoices {
        fn new(broken: &'static [&'static str]) -> Arc<Self> {
            Arc::new(Self {
                broken,
                tried: std::sync::Mutex::new(Vec::new()),
            })
        }

        fn tried(&self) -> Vec<String> {
            self.tried.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SynthesisCapability for PartialVoices {
        fn supports_locale(&self, _locale: &str) -> bool {
            true
        }

        async fn speak(
            &self,
            utterance: Utterance,
        ) -> crate::Result<BoxStream<'static, SynthesisEvent>> {
            self.tried.lock().unwrap().push(utterance.locale.clone());
            if self.broken.contains(&utterance.locale.as_str()) {
                return Err(crate::Error::Synthesis("engine not initialised".to_string()));
            }
            Ok(stream::iter([SynthesisEvent::Started, SynthesisEvent::Done]).boxed())
        }

        async fn stop(&self) {}
    }

    #[tokio::test]
    async fn test_refused_voice_degrades_to_default_locale() {
        let engine = PartialVoices::new(&["hi-IN"]);
        let stage = SpeechSynthesisStage::new(engine.clone());
        let (sink, mut rx) = EventSink::channel();

        stage.speak(SessionId::new(), &request(Language::Hindi, Emotion::Tired), sink);

        let events = collect(&mut rx, 2).await;
        assert_eq!(events[0].name(), "tts-started");
        assert_eq!(events[1].name(), "tts-done");
        assert_eq!(engine.tried(), ["hi-IN", DEFAULT_LOCALE]);
    }

    #[tokio::test]
    async fn test_refused_default_voice_is_terminal() {
        let engine = PartialVoices::new(&["hi-IN", "en-US"]);
        let stage = SpeechSynthesisStage::new(engine.clone());
        let (sink, mut rx) = EventSink::channel();

        stage.speak(SessionId::new(), &request(Language::Hindi, Emotion::Tired), sink);

        let events = collect(&mut rx, 2).await;
        assert_eq!(events[0].name(), "tts-started");
        match &events[1].kind {
            EventKind::TtsError { message } => assert!(message.contains("engine not initialised")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(engine.tried(), ["hi-IN", DEFAULT_LOCALE]);
    }

    #[tokio::test]
    async fn test_default_locale_is_not_retried() {
        let engine = PartialVoices::new(&["en-US"]);
        let stage = SpeechSynthesisStage::new(engine.clone());
        let (sink, mut rx) = EventSink::channel();

        stage.speak(SessionId::new(), &request(Language::English, Emotion::Happy), sink);

        let events = collect(&mut rx, 2).await;
        assert_eq!(events[1].name(), "tts-error");
        assert_eq!(engine.tried(), [DEFAULT_LOCALE]);
    }

    #[tokio::test]
    async fn test_completed_utterance_is_not_flushed() {
        let stage = stage(vec![SynthesisEvent::Started, SynthesisEvent::Done], false);
        let (sink, mut rx) = EventSink::channel();
        let first = SessionId::new();
        let second = SessionId::new();

        stage.speak(first, &request(Language::English, Emotion::Neutral), sink.clone());
        let events = collect(&mut rx, 2).await;
        assert_eq!(events[1].name(), "tts-done");

        // The first task may still be returning; its terminal event already went out
        stage.speak(second, &request(Language::English, Emotion::Neutral), sink);

        let events = collect(&mut rx, 2).await;
        assert!(events.iter().all(|e| e.session_id == Some(second)));
        assert_eq!(events[0].name(), "tts-started");
        assert_eq!(events[1].name(), "tts-done");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_new_request_flushes_prior() {
        let stage = stage(vec![SynthesisEvent::Started], true);
        let (sink, mut rx) = EventSink::channel();
        let first = SessionId::new();
        let second = SessionId::new();

        stage.speak(first, &request(Language::English, Emotion::Neutral), sink.clone());
        let started = rx.recv().await.unwrap();
        assert_eq!(started.session_id, Some(first));

        stage.speak(second, &request(Language::English, Emotion::Neutral), sink);

        let flushed = rx.recv().await.unwrap();
        assert_eq!(flushed.session_id, Some(first));
        assert_eq!(flushed.name(), "tts-error");

        let next = rx.recv().await.unwrap();
        assert_eq!(next.session_id, Some(second));
        assert_eq!(next.name(), "tts-started");
    }
}
