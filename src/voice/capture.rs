//! Speech capture stage
//!
//! Opens a recognition stream and turns it into session events: any number of
//! partials and audio levels, then exactly one terminal event.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, timeout_at};

use super::{CaptureCapability, RecognitionErrorKind, RecognitionEvent};
use crate::events::{EventKind, EventSink};
use crate::session::{SessionId, Transcript};

/// Drives a [`CaptureCapability`] for one session at a time
#[derive(Clone)]
pub struct SpeechCaptureStage {
    capability: Arc<dyn CaptureCapability>,
    locales: Vec<String>,
    silence_timeout: Duration,
}

impl SpeechCaptureStage {
    #[must_use]
    pub fn new(
        capability: Arc<dyn CaptureCapability>,
        locales: Vec<String>,
        silence_timeout: Duration,
    ) -> Self {
        Self {
            capability,
            locales,
            silence_timeout,
        }
    }

    /// Start listening for `session_id` in the background
    pub fn start(&self, session_id: SessionId, sink: EventSink) -> JoinHandle<()> {
        let stage = self.clone();
        tokio::spawn(async move {
            let terminal = stage.listen(session_id, &sink).await;
            match &terminal {
                EventKind::TranscriptFinal { transcript } => {
                    tracing::debug!(%session_id, chars = transcript.text.len(), "capture finished");
                }
                EventKind::RecognitionError { kind } => {
                    tracing::info!(%session_id, %kind, "capture failed");
                }
                _ => {}
            }
            sink.emit(session_id, terminal);
        })
    }

    /// Run the recognition stream; returns the terminal event
    async fn listen(&self, session_id: SessionId, sink: &EventSink) -> EventKind {
        sink.emit(session_id, EventKind::ListeningStarted);

        let mut stream = match self.capability.start_listening(&self.locales).await {
            Ok(stream) => stream,
            Err(kind) => return EventKind::RecognitionError { kind },
        };

        tracing::debug!(%session_id, locales = ?self.locales, "recognition stream open");

        // Only speech pushes the deadline back; level telemetry does not
        let mut deadline = Instant::now() + self.silence_timeout;

        loop {
            let Ok(next) = timeout_at(deadline, stream.next()).await else {
                return EventKind::RecognitionError {
                    kind: RecognitionErrorKind::SpeechTimeout,
                };
            };

            match next {
                None => {
                    tracing::warn!(%session_id, "recognition stream ended without a result");
                    return EventKind::RecognitionError {
                        kind: RecognitionErrorKind::ClientError,
                    };
                }
                Some(RecognitionEvent::Partial(text)) => {
                    deadline = Instant::now() + self.silence_timeout;
                    sink.emit(session_id, EventKind::PartialTranscript { text });
                }
                Some(RecognitionEvent::AudioLevel(rms_db)) => {
                    sink.emit(session_id, EventKind::AudioLevel { rms_db });
                }
                Some(RecognitionEvent::Final { text, locale }) => {
                    let text = text.trim();
                    if text.is_empty() {
                        return EventKind::RecognitionError {
                            kind: RecognitionErrorKind::NoMatch,
                        };
                    }
                    return EventKind::TranscriptFinal {
                        transcript: Transcript {
                            language: locale,
                            ..Transcript::final_text(text)
                        },
                    };
                }
                Some(RecognitionEvent::Error(kind)) => {
                    return EventKind::RecognitionError { kind };
                }
            }
        }
    }
}
