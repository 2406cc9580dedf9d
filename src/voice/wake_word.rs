//! Wake phrase matching and the wake trigger
//!
//! The trigger arms a [`WakeCapability`] when the assistant is enabled. If the
//! detector cannot start it degrades to manual triggers only.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{WakeCallback, WakeCapability};
use crate::events::{EventSink, WakeSource};

/// A normalised wake phrase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WakePhrase(String);

impl WakePhrase {
    #[must_use]
    pub fn new(phrase: &str) -> Self {
        Self(phrase.trim().to_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if a transcript line contains the phrase
    #[must_use]
    pub fn matches(&self, transcript: &str) -> bool {
        !self.0.is_empty() && transcript.to_lowercase().contains(&self.0)
    }

    /// Text following the phrase, with separators stripped
    ///
    /// Returns `None` when the phrase is absent.
    #[must_use]
    pub fn extract_command(&self, transcript: &str) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        // Lower-case per character, remembering where each original character
        // starts in both strings; case mapping can change byte lengths
        let mut lower = String::with_capacity(transcript.len());
        let mut offsets = Vec::with_capacity(transcript.len());
        for (idx, c) in transcript.char_indices() {
            offsets.push((lower.len(), idx));
            lower.extend(c.to_lowercase());
        }

        let end = lower.find(&self.0)? + self.0.len();
        let cut = offsets
            .iter()
            .find(|(lower_idx, _)| *lower_idx >= end)
            .map_or(transcript.len(), |&(_, idx)| idx);
        let command = &transcript[cut..];

        Some(
            command
                .trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == '.')
                .trim_end()
                .to_string(),
        )
    }
}

/// Turns detections and manual requests into `wake-detected` events
pub struct WakeTrigger {
    capability: Arc<dyn WakeCapability>,
    sink: EventSink,
    armed: AtomicBool,
}

impl WakeTrigger {
    #[must_use]
    pub fn new(capability: Arc<dyn WakeCapability>, sink: EventSink) -> Self {
        Self {
            capability,
            sink,
            armed: AtomicBool::new(false),
        }
    }

    /// Start the detector; on failure stay manual-only
    pub async fn arm(&self) {
        if self.is_armed() {
            return;
        }

        let sink = self.sink.clone();
        let callback: WakeCallback = Arc::new(move || sink.wake(WakeSource::Detector));

        match self.capability.start(callback).await {
            Ok(()) => {
                self.armed.store(true, Ordering::SeqCst);
                tracing::info!("wake detector armed");
            }
            Err(e) => {
                tracing::warn!(error = %e, "wake detector unavailable, manual trigger only");
            }
        }
    }

    /// Stop the detector
    pub async fn disarm(&self) {
        if self.armed.swap(false, Ordering::SeqCst) {
            self.capability.stop().await;
            tracing::info!("wake detector disarmed");
        }
    }

    /// Fire a wake from a UI affordance; always available
    pub fn trigger_manual(&self) {
        tracing::debug!("manual wake");
        self.sink.wake(WakeSource::Manual);
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}
