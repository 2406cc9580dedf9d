//! Text classification
//!
//! Two independent, pure classifiers run on every final transcript:
//! - [`LanguageClassifier`] tags the text as Hindi, English, Hinglish or Unknown
//! - [`EmotionClassifier`] picks the dominant emotional tone
//!
//! Both return a [`ClassificationResult`]; the orchestrator keeps only the value.

mod emotion;
mod language;

use serde::Serialize;

pub use emotion::{Emotion, EmotionClassifier};
pub use language::{Language, LanguageClassifier};

/// A classified value with the score that won it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationResult<T> {
    /// Winning tag
    pub value: T,
    /// Score backing the decision (0 when a default was applied)
    pub score: u32,
}

impl<T> ClassificationResult<T> {
    /// Create a result
    pub const fn new(value: T, score: u32) -> Self {
        Self { value, score }
    }
}
