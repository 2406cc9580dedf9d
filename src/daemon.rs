//! Daemon - the assistant service
//!
//! Wires the console capabilities, the stages, the orchestrator and the HTTP
//! API together and runs until interrupted.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::api::{ApiServer, ApiState};
use crate::events::{EventBus, EventKind};
use crate::orchestrator::SessionOrchestrator;
use crate::preferences::PreferenceStore;
use crate::response::ResponseGenerator;
use crate::voice::{
    ConsoleIo, ConsoleSynthesizer, SpeechCaptureStage, SpeechSynthesisStage, WakePhrase,
    WakeTrigger,
};
use crate::{Config, Result};

/// The Sahayak daemon
pub struct Daemon {
    config: Config,
    serve_api: bool,
}

impl Daemon {
    /// Create a new daemon instance
    #[must_use]
    pub const fn new(config: Config, serve_api: bool) -> Self {
        Self { config, serve_api }
    }

    /// Run the daemon until interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the daemon encounters a fatal error
    pub async fn run(self) -> Result<()> {
        let config = self.config;
        tracing::info!(
            name = %config.assistant.name,
            wake_phrase = %config.assistant.wake_phrase,
            model = %config.llm.model,
            "daemon starting"
        );

        let bus = EventBus::new();
        let console = ConsoleIo::new(WakePhrase::new(&config.assistant.wake_phrase));

        let capture = SpeechCaptureStage::new(
            Arc::new(console.capture()),
            config.capture.locales.clone(),
            config.capture.silence_timeout,
        );
        let synthesis = SpeechSynthesisStage::new(Arc::new(ConsoleSynthesizer));
        let generator = ResponseGenerator::from_config(&config);

        let orchestrator = SessionOrchestrator::new(capture, synthesis, generator, bus.clone());
        console.follow(orchestrator.state()).await;
        let wake = Arc::new(WakeTrigger::new(
            Arc::new(console.wake()),
            orchestrator.sink(),
        ));

        let preferences = PreferenceStore::new(config.preferences_path());
        if preferences.load().enabled {
            wake.arm().await;
        } else {
            tracing::info!(
                path = %preferences.path().display(),
                "assistant disabled, manual wake only"
            );
        }

        if self.serve_api && config.server.enabled {
            let state = ApiState {
                wake: Arc::clone(&wake),
                state: orchestrator.state(),
                bus: bus.clone(),
                preferences,
            };
            let server = ApiServer::new(state, config.server.port).spawn();
            tokio::spawn(async move {
                match server.await {
                    Ok(Err(e)) => tracing::error!(error = %e, "API server stopped"),
                    Err(e) => tracing::error!(error = %e, "API server task failed"),
                    Ok(Ok(())) => {}
                }
            });
        }

        spawn_console_reporter(&bus);
        let stdin = Arc::clone(&console).spawn_stdin();

        orchestrator
            .run(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "failed to listen for ctrl-c");
                    std::future::pending::<()>().await;
                }
                tracing::info!("shutdown requested");
            })
            .await;

        wake.disarm().await;
        stdin.abort();
        Ok(())
    }
}

/// Print what the assistant understood to the console
fn spawn_console_reporter(bus: &EventBus) {
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };

            match event.kind {
                EventKind::SpeechRecognized {
                    language, emotion, ..
                } => {
                    println!("(heard {} / {})", language.name(), emotion.description());
                }
                EventKind::RecognitionError { kind } => println!("(didn't catch that: {kind})"),
                EventKind::AiError { message } => tracing::debug!(%message, "using fallback reply"),
                _ => {}
            }
        }
    });
}
