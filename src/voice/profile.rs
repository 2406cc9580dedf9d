//! Voice lookup tables
//!
//! Language to synthesis locale, and emotion to prosody. Each table lives
//! here once with an explicit default for misses.

use crate::classify::{Emotion, Language};

/// Locale used whenever nothing better is available
pub const DEFAULT_LOCALE: &str = "en-US";

/// Speaking rate and pitch multipliers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prosody {
    pub rate: f32,
    pub pitch: f32,
}

impl Prosody {
    const fn new(rate: f32, pitch: f32) -> Self {
        Self { rate, pitch }
    }
}

/// Synthesis locale for a detected language
#[must_use]
pub const fn locale_for(language: Language) -> &'static str {
    match language {
        Language::Hindi => "hi-IN",
        Language::Hinglish => "en-IN",
        Language::English | Language::Unknown => DEFAULT_LOCALE,
    }
}

/// Prosody for a detected emotion
#[must_use]
pub const fn prosody_for(emotion: Emotion) -> Prosody {
    match emotion {
        Emotion::Happy => Prosody::new(1.1, 1.1),
        Emotion::Sad => Prosody::new(0.8, 0.9),
        Emotion::Excited => Prosody::new(1.2, 1.2),
        Emotion::Tired => Prosody::new(0.9, 0.95),
        Emotion::Angry | Emotion::Neutral => Prosody::new(1.0, 1.0),
    }
}

/// Prosody for an emotion tag from outside the crate; unknown tags read as neutral
#[must_use]
pub fn prosody_for_tag(tag: &str) -> Prosody {
    prosody_for(Emotion::from_tag(tag).unwrap_or(Emotion::Neutral))
}
