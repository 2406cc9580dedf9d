//! Console stand-ins for the platform voice capabilities
//!
//! Typed stdin lines play the part of recognised speech and replies are
//! printed instead of spoken. A line containing the wake phrase fires the
//! wake callback; any text after the phrase becomes the next session's
//! transcript.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::{
    CaptureCapability, RecognitionErrorKind, RecognitionEvent, SynthesisCapability,
    SynthesisEvent, Utterance, WakeCallback, WakeCapability, WakePhrase,
};
use crate::Result;
use crate::session::SessionState;

#[derive(Default)]
struct ConsoleState {
    /// Open recognition stream waiting for the next line
    listener: Option<mpsc::UnboundedSender<RecognitionEvent>>,
    /// Command typed together with the wake phrase
    pending: Option<String>,
    on_wake: Option<WakeCallback>,
    /// Orchestrator state; wake lines are refused while a session runs
    session: Option<watch::Receiver<SessionState>>,
}

/// Shared stdin router behind [`ConsoleCapture`] and [`ConsoleWake`]
pub struct ConsoleIo {
    phrase: WakePhrase,
    state: Mutex<ConsoleState>,
}

impl ConsoleIo {
    #[must_use]
    pub fn new(phrase: WakePhrase) -> Arc<Self> {
        Arc::new(Self {
            phrase,
            state: Mutex::new(ConsoleState::default()),
        })
    }

    #[must_use]
    pub fn capture(self: &Arc<Self>) -> ConsoleCapture {
        ConsoleCapture(Arc::clone(self))
    }

    #[must_use]
    pub fn wake(self: &Arc<Self>) -> ConsoleWake {
        ConsoleWake(Arc::clone(self))
    }

    /// Follow the orchestrator so wake lines typed mid-session are refused
    pub async fn follow(&self, session: watch::Receiver<SessionState>) {
        self.state.lock().await.session = Some(session);
    }

    /// Route one input line
    pub async fn route_line(&self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }

        let mut state = self.state.lock().await;

        if let Some(listener) = state.listener.take() {
            if listener.send(RecognitionEvent::final_text(line.to_string())).is_ok() {
                return;
            }
            // the stream was dropped (timeout); treat the line as fresh input
        }

        let Some(command) = self.phrase.extract_command(line) else {
            tracing::debug!("no session listening, input ignored");
            return;
        };

        let Some(on_wake) = state.on_wake.clone() else {
            println!("(assistant disabled: run `sahayak enable` or POST /api/assistant/wake)");
            return;
        };

        // The orchestrator drops mid-session wakes; their command must not be queued
        let busy = state
            .session
            .as_ref()
            .is_some_and(|s| !s.borrow().is_quiescent());
        if busy {
            tracing::debug!("session in progress, wake line dropped");
            println!("(still busy, try again in a moment)");
            return;
        }

        state.pending = (!command.is_empty()).then_some(command);
        drop(state);
        on_wake();
    }

    /// Pump stdin lines until EOF
    pub fn spawn_stdin(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => self.route_line(&line).await,
                    Ok(None) => {
                        tracing::info!("stdin closed");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
        })
    }
}

/// Reads the next stdin line as a final transcript
pub struct ConsoleCapture(Arc<ConsoleIo>);

#[async_trait]
impl CaptureCapability for ConsoleCapture {
    async fn start_listening(
        &self,
        _locales: &[String],
    ) -> std::result::Result<BoxStream<'static, RecognitionEvent>, RecognitionErrorKind> {
        let mut state = self.0.state.lock().await;

        if let Some(command) = state.pending.take() {
            return Ok(stream::iter([RecognitionEvent::final_text(command)]).boxed());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        state.listener = Some(tx);
        println!("(listening...)");
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

/// Fires when a typed line contains the wake phrase
pub struct ConsoleWake(Arc<ConsoleIo>);

#[async_trait]
impl WakeCapability for ConsoleWake {
    async fn start(&self, on_trigger: WakeCallback) -> Result<()> {
        self.0.state.lock().await.on_wake = Some(on_trigger);
        println!("(say \"{}\" to wake me)", self.0.phrase.as_str());
        Ok(())
    }

    async fn stop(&self) {
        self.0.state.lock().await.on_wake = None;
    }
}

/// Prints replies with their voice settings
#[derive(Debug, Default)]
pub struct ConsoleSynthesizer;

#[async_trait]
impl SynthesisCapability for ConsoleSynthesizer {
    fn supports_locale(&self, _locale: &str) -> bool {
        true
    }

    async fn speak(&self, utterance: Utterance) -> Result<BoxStream<'static, SynthesisEvent>> {
        println!(
            "[{} {}/{}] {}",
            utterance.locale, utterance.rate, utterance.pitch, utterance.text
        );
        Ok(stream::iter([SynthesisEvent::Started, SynthesisEvent::Done]).boxed())
    }

    async fn stop(&self) {}
}
