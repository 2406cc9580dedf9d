//! Shared test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use sahayak::response::{ChatCompletionRequest, CompletionBackend, CompletionParams, Persona};
use sahayak::voice::{
    CaptureCapability, RecognitionErrorKind, RecognitionEvent, SpeechCaptureStage,
    SpeechSynthesisStage, SynthesisCapability, SynthesisEvent, Utterance, WakeCallback,
    WakeCapability,
};
use sahayak::{
    Error, Event, EventBus, EventSink, ResponseGenerator, Result, SessionOrchestrator,
    SessionState,
};
use tokio::sync::{Notify, broadcast, watch};

/// Recogniser that plays a fixed script, then stays silent
pub struct ScriptedCapture {
    script: Vec<RecognitionEvent>,
    calls: AtomicUsize,
}

impl ScriptedCapture {
    pub fn new(script: Vec<RecognitionEvent>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaptureCapability for ScriptedCapture {
    async fn start_listening(
        &self,
        _locales: &[String],
    ) -> std::result::Result<BoxStream<'static, RecognitionEvent>, RecognitionErrorKind> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(stream::iter(self.script.clone())
            .chain(stream::pending())
            .boxed())
    }
}

/// Synthesiser that records utterances and optionally waits for a release
pub struct RecordingSynth {
    utterances: Mutex<Vec<Utterance>>,
    gate: Option<Arc<Notify>>,
}

impl RecordingSynth {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            utterances: Mutex::new(Vec::new()),
            gate: None,
        })
    }

    /// Each utterance finishes only after `gate.notify_one()`
    pub fn gated(gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            utterances: Mutex::new(Vec::new()),
            gate: Some(gate),
        })
    }

    pub fn utterances(&self) -> Vec<Utterance> {
        self.utterances.lock().unwrap().clone()
    }
}

#[async_trait]
impl SynthesisCapability for RecordingSynth {
    fn supports_locale(&self, _locale: &str) -> bool {
        true
    }

    async fn speak(&self, utterance: Utterance) -> Result<BoxStream<'static, SynthesisEvent>> {
        self.utterances.lock().unwrap().push(utterance);

        let gate = self.gate.clone();
        let finish = stream::once(async move {
            if let Some(gate) = gate {
                gate.notified().await;
            }
            SynthesisEvent::Done
        });
        Ok(stream::iter([SynthesisEvent::Started]).chain(finish).boxed())
    }

    async fn stop(&self) {}
}

/// Completion backend that records requests; `None` reply fails every call
pub struct RecordingBackend {
    reply: Option<String>,
    requests: Mutex<Vec<ChatCompletionRequest>>,
}

impl RecordingBackend {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply
            .clone()
            .ok_or_else(|| Error::Backend("backend unavailable".to_string()))
    }
}

/// Wake detector whose model never loads
pub struct FailingWake;

#[async_trait]
impl WakeCapability for FailingWake {
    async fn start(&self, _on_trigger: WakeCallback) -> Result<()> {
        Err(Error::WakeWord("wake model missing".to_string()))
    }

    async fn stop(&self) {}
}

/// Wake detector that starts cleanly and counts arm/disarm calls
#[derive(Default)]
pub struct CountingWake {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

#[async_trait]
impl WakeCapability for CountingWake {
    async fn start(&self, _on_trigger: WakeCallback) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn test_persona() -> Persona {
    Persona {
        name: "Sahayak".to_string(),
        description: "a caring friend.".to_string(),
    }
}

/// A running orchestrator with its observation points
pub struct Pipeline {
    pub sink: EventSink,
    pub events: broadcast::Receiver<Event>,
    pub state: watch::Receiver<SessionState>,
}

/// Start an orchestrator over the given fakes
pub fn spawn_pipeline(
    capture: Arc<ScriptedCapture>,
    synth: Arc<RecordingSynth>,
    backend: Arc<RecordingBackend>,
    silence_timeout: Duration,
) -> Pipeline {
    let bus = EventBus::new();
    let events = bus.subscribe();

    let generator = ResponseGenerator::new(
        test_persona(),
        CompletionParams::default(),
        Some(backend as Arc<dyn CompletionBackend>),
    );
    let orchestrator = SessionOrchestrator::new(
        SpeechCaptureStage::new(
            capture,
            vec!["hi-IN".to_string(), "en-US".to_string()],
            silence_timeout,
        ),
        SpeechSynthesisStage::new(synth),
        generator,
        bus,
    );

    let pipeline = Pipeline {
        sink: orchestrator.sink(),
        events,
        state: orchestrator.state(),
    };
    tokio::spawn(orchestrator.run(std::future::pending()));
    pipeline
}

/// Receive the next upward event, failing the test after five seconds
pub async fn next_event(events: &mut broadcast::Receiver<Event>) -> Event {
    tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event bus closed")
}

/// Collect events up to and including the next `session-ended`
pub async fn until_session_ended(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut seen = Vec::new();
    loop {
        let event = next_event(events).await;
        let done = event.name() == "session-ended";
        seen.push(event);
        if done {
            return seen;
        }
    }
}

/// Skip events until one named `name` arrives
pub async fn wait_for(events: &mut broadcast::Receiver<Event>, name: &str) -> Event {
    loop {
        let event = next_event(events).await;
        if event.name() == name {
            return event;
        }
    }
}
