//! Language detection for Hindi, English and Hinglish text
//!
//! Decision order is fixed: Devanagari script, then lexicon score, then the
//! function-word regex fallback, then English.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ClassificationResult;

/// Romanised Hindi words common in mixed speech
const HINGLISH_LEXICON: &[&str] = &[
    "kya", "hai", "hain", "kar", "karo", "kaise", "kaun", "kahan", "kab", "kyun", "acha", "accha",
    "theek", "thik", "bhi", "aur", "ya", "nahi", "nahin", "haan", "ji", "sahab", "madam", "bhai",
    "didi", "uncle", "aunty", "beta", "mummy", "papa", "dada", "nana", "nani", "dadi", "ghar",
    "paani", "khana", "suno", "dekho", "chalo", "aao", "jao", "ruko", "bas", "abhi", "phir",
    "kuch", "koi", "sab", "sabko", "mujhe", "tumhe", "usse", "iske", "uske", "mere", "tere",
    "hamara", "tumhara", "unka", "yahan", "wahan", "kal", "aaj", "parso", "subah", "sham", "raat",
    "din", "samay", "time",
];

/// High-frequency English words
const ENGLISH_LEXICON: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "from", "up",
    "about", "into", "through", "during", "before", "after", "above", "below", "between",
    "among", "this", "that", "these", "those", "you", "he", "she", "it", "we", "they", "me",
    "him", "her", "us", "them", "my", "your", "his", "its", "our", "their", "mine", "yours",
    "ours", "what", "when", "where", "why", "how", "who", "which", "whose", "whom", "is", "am",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did",
    "will", "would", "could", "should", "may", "might", "must", "can", "cannot", "hello", "hi",
    "hey", "bye", "goodbye", "please", "thank", "thanks", "sorry", "feel", "feeling", "very",
    "so", "really", "today", "not", "just", "good",
];

static HINGLISH_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| HINGLISH_LEXICON.iter().copied().collect());

static ENGLISH_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_LEXICON.iter().copied().collect());

static DEVANAGARI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\u{0900}-\u{097F}]").expect("valid regex"));

static VOWEL_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[aeiou]{2,}").expect("valid regex"));

static HINGLISH_FUNCTION_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:kya|hai|hain|kar|acha|theek|nahi|haan|ji|bhi)\b").expect("valid regex")
});

static ENGLISH_FUNCTION_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:the|and|what|how|when|where|why|can|will|is)\b").expect("valid regex")
});

/// Detected language of a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Devanagari-script Hindi
    Hindi,
    English,
    /// Romanised Hindi mixed with English
    Hinglish,
    /// Nothing to classify
    Unknown,
}

impl Language {
    /// Short language code (`hi`, `en`, `hi-en`)
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Hindi => "hi",
            Self::Hinglish => "hi-en",
            Self::English | Self::Unknown => "en",
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hindi => "Hindi",
            Self::English => "English",
            Self::Hinglish => "Hinglish",
            Self::Unknown => "Unknown",
        }
    }

    /// Parse a language code or name, case-insensitively
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "hi" | "hindi" => Some(Self::Hindi),
            "en" | "english" => Some(Self::English),
            "hi-en" | "hinglish" => Some(Self::Hinglish),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies text as Hindi, English or Hinglish
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageClassifier;

impl LanguageClassifier {
    /// Detect the language of `text`
    #[must_use]
    pub fn classify(text: &str) -> ClassificationResult<Language> {
        if text.trim().is_empty() {
            return ClassificationResult::new(Language::Unknown, 0);
        }

        let devanagari = DEVANAGARI.find_iter(text).count();
        if devanagari > 0 {
            tracing::debug!(chars = devanagari, "devanagari script found");
            return ClassificationResult::new(Language::Hindi, count_score(devanagari));
        }

        let lowered = text.to_lowercase();
        let (hinglish, english) = lexicon_scores(&lowered);
        tracing::trace!(hinglish, english, "lexicon scores");

        let result = if hinglish > english {
            ClassificationResult::new(Language::Hinglish, hinglish)
        } else if english > hinglish {
            ClassificationResult::new(Language::English, english)
        } else if hinglish > 0 {
            // Even split reads as mixed speech
            ClassificationResult::new(Language::Hinglish, hinglish)
        } else if HINGLISH_FUNCTION_WORDS.is_match(&lowered) {
            ClassificationResult::new(Language::Hinglish, 1)
        } else if ENGLISH_FUNCTION_WORDS.is_match(&lowered) {
            ClassificationResult::new(Language::English, 1)
        } else {
            ClassificationResult::new(Language::English, 0)
        };

        tracing::debug!(language = %result.value, score = result.score, "language detected");
        result
    }
}

/// Sum Hinglish and English token scores for lower-cased text
fn lexicon_scores(lowered: &str) -> (u32, u32) {
    let mut hinglish = 0;
    let mut english = 0;

    for token in lowered.split_whitespace() {
        let word: String = token.chars().filter(char::is_ascii_alphabetic).collect();
        if word.len() < 2 {
            continue;
        }

        if HINGLISH_WORDS.contains(word.as_str()) {
            hinglish += 2;
        } else if ENGLISH_WORDS.contains(word.as_str()) {
            english += 1;
        } else if looks_hinglish(&word) {
            hinglish += 1;
        }
    }

    (hinglish, english)
}

/// Spelling patterns typical of romanised Hindi
fn looks_hinglish(word: &str) -> bool {
    (word.ends_with("ji") && word.len() > 2)
        || word.ends_with("wala")
        || word.ends_with("wali")
        || VOWEL_RUN.is_match(word)
}

fn count_score(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}
