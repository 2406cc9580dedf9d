//! Emotion detection from transcript text
//!
//! Each emotion scores one point per distinct keyword found (whole word,
//! case-insensitive) in each of its English, Hindi and Hinglish keyword sets.
//! Punctuation and emoticons add bonuses. The strictly highest score wins,
//! ties resolve by [`Emotion::ORDER`], and no signal at all means Neutral.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ClassificationResult;

/// Detected emotional tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Excited,
    Tired,
    Neutral,
}

impl Emotion {
    /// Fixed tie-break order: on equal scores the earlier entry wins
    pub const ORDER: [Self; 6] = [
        Self::Happy,
        Self::Sad,
        Self::Angry,
        Self::Excited,
        Self::Tired,
        Self::Neutral,
    ];

    /// Lower-case tag (`happy`, `sad`, ...)
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Excited => "excited",
            Self::Tired => "tired",
            Self::Neutral => "neutral",
        }
    }

    /// Short description for display surfaces
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Happy => "Happy and positive",
            Self::Sad => "Sad or upset",
            Self::Angry => "Angry or frustrated",
            Self::Excited => "Excited and enthusiastic",
            Self::Tired => "Tired or sleepy",
            Self::Neutral => "Neutral or calm",
        }
    }

    /// Indicator colour (hex) for shells that render the current mood
    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::Happy => "#4CAF50",
            Self::Sad => "#2196F3",
            Self::Angry => "#F44336",
            Self::Excited => "#FF9800",
            Self::Tired => "#9C27B0",
            Self::Neutral => "#607D8B",
        }
    }

    /// Parse an emotion tag, case-insensitively
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        Self::ORDER
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword sets for one emotion, one per language variant
struct KeywordSet {
    emotion: Emotion,
    english: &'static [&'static str],
    hindi: &'static [&'static str],
    hinglish: &'static [&'static str],
}

const KEYWORDS: &[KeywordSet] = &[
    KeywordSet {
        emotion: Emotion::Happy,
        english: &[
            "happy", "joy", "joyful", "excited", "great", "awesome", "amazing", "wonderful",
            "fantastic", "excellent", "good", "nice", "love", "loving", "cheerful", "glad",
            "delighted", "thrilled", "elated", "ecstatic", "blissful", "content", "pleased",
            "yay", "woohoo", "haha", "lol", "smile", "smiling", "laugh", "laughing",
        ],
        hindi: &[
            "khush", "khushi", "prasann", "anand", "maza", "accha", "badhiya", "zabardast",
            "kamaal", "shandar", "sundar", "pyaar", "mohabbat", "hasna", "muskurana", "khushiyan",
            "umang", "josh", "utsah",
        ],
        hinglish: &[
            "khush", "happy", "maza", "fun", "accha", "good", "badhiya", "great", "zabardast",
            "awesome", "kamaal", "amazing", "mast", "cool", "bindaas",
        ],
    },
    KeywordSet {
        emotion: Emotion::Sad,
        english: &[
            "sad", "sadness", "unhappy", "depressed", "down", "low", "blue", "upset",
            "disappointed", "heartbroken", "miserable", "gloomy", "melancholy", "sorrowful",
            "grief", "crying", "cry", "tears", "hurt", "pain", "lonely", "alone", "devastated",
            "crushed", "broken", "hopeless", "despair",
        ],
        hindi: &[
            "udas", "dukhi", "pareshan", "tension", "chinta", "gam", "dard", "takleef", "rona",
            "aansu", "akela", "nirash", "hatash", "dukhad", "vyakulta",
        ],
        hinglish: &[
            "udas", "sad", "dukhi", "upset", "pareshan", "worried", "tension", "stress", "down",
            "low", "hurt", "pain", "rona", "cry", "akela", "alone",
        ],
    },
    KeywordSet {
        emotion: Emotion::Angry,
        english: &[
            "angry", "mad", "furious", "rage", "annoyed", "irritated", "frustrated", "pissed",
            "livid", "outraged", "enraged", "irate", "fuming", "heated", "hate", "disgusted",
            "fed up", "sick of", "damn", "hell", "stupid", "idiot",
        ],
        hindi: &[
            "gussa", "krodh", "naraz", "chidh", "pareshan", "ghussa", "khafa", "badtameez",
            "pagal", "bewakoof", "nautanki", "bakwas",
        ],
        hinglish: &[
            "gussa", "angry", "mad", "naraz", "upset", "frustrated", "irritated", "pagal",
            "stupid", "bakwas", "nonsense", "fed up", "sick",
        ],
    },
    KeywordSet {
        emotion: Emotion::Excited,
        english: &[
            "excited", "thrilled", "pumped", "energetic", "enthusiastic", "eager", "can't wait",
            "amazing", "incredible", "unbelievable", "wow", "omg", "fantastic", "brilliant",
            "outstanding", "superb", "marvelous",
        ],
        hindi: &[
            "utsahit", "josh", "umang", "jazbaat", "excitement", "energy", "shakti", "hausla",
            "himmat", "junoon", "deewana", "pagal",
        ],
        hinglish: &[
            "excited", "josh", "energy", "pumped", "thrilled", "amazing", "incredible", "wow",
            "omg", "fantastic", "brilliant", "zabardast", "kamaal",
        ],
    },
    KeywordSet {
        emotion: Emotion::Tired,
        english: &[
            "tired", "exhausted", "sleepy", "drowsy", "weary", "fatigued", "drained",
            "worn out", "beat", "spent", "lazy", "lethargic", "sluggish", "yawn", "sleep",
            "rest", "nap", "bed", "can't keep eyes open",
        ],
        hindi: &[
            "thak", "thaka", "neend", "sona", "aaram", "vishram", "kamzor", "shithil", "alsi",
            "sust", "jhamak", "angdai",
        ],
        hinglish: &[
            "tired", "thaka", "sleepy", "neend", "drowsy", "exhausted", "drained", "lazy",
            "alsi", "rest", "aaram", "sleep", "sona",
        ],
    },
];

const HAPPY_EMOTICONS: &[&str] = &[":)", ":-)", ":D", "😊", "😄", "😃", "🙂", "😁"];
const SAD_EMOTICONS: &[&str] = &[":(", ":-(", "😢", "😭", "😞", "😔", "☹️"];
const ANGRY_EMOTICONS: &[&str] = &["😠", "😡", "🤬", "😤"];

/// Compiled whole-word matchers, one list per keyword-set variant
struct CompiledSet {
    emotion: Emotion,
    variants: [Vec<Regex>; 3],
}

static MATCHERS: LazyLock<Vec<CompiledSet>> = LazyLock::new(|| {
    KEYWORDS
        .iter()
        .map(|set| CompiledSet {
            emotion: set.emotion,
            variants: [
                compile(set.english),
                compile(set.hindi),
                compile(set.hinglish),
            ],
        })
        .collect()
});

fn compile(keywords: &[&str]) -> Vec<Regex> {
    keywords
        .iter()
        .map(|kw| {
            Regex::new(&format!(r"(?i)\b{}\b", regex::escape(kw))).expect("valid keyword regex")
        })
        .collect()
}

/// Classifies the emotional tone of text
#[derive(Debug, Clone, Copy, Default)]
pub struct EmotionClassifier;

impl EmotionClassifier {
    /// Detect the dominant emotion in `text`
    #[must_use]
    pub fn classify(text: &str) -> ClassificationResult<Emotion> {
        let scores = Self::scores(text);

        let mut best = ClassificationResult::new(Emotion::Neutral, 0);
        for candidate in scores {
            if candidate.score > best.score {
                best = candidate;
            }
        }

        tracing::debug!(emotion = %best.value, score = best.score, "emotion detected");
        best
    }

    /// Score every emotion, in [`Emotion::ORDER`]
    #[must_use]
    pub fn scores(text: &str) -> Vec<ClassificationResult<Emotion>> {
        if text.trim().is_empty() {
            return Emotion::ORDER
                .iter()
                .map(|&e| ClassificationResult::new(e, 0))
                .collect();
        }

        let lowered = text.to_lowercase();

        Emotion::ORDER
            .iter()
            .map(|&emotion| {
                let score = keyword_score(emotion, &lowered) + heuristic_bonus(emotion, text);
                ClassificationResult::new(emotion, score)
            })
            .collect()
    }
}

/// Distinct keyword hits for `emotion` across all three variants
fn keyword_score(emotion: Emotion, lowered: &str) -> u32 {
    MATCHERS
        .iter()
        .filter(|set| set.emotion == emotion)
        .flat_map(|set| set.variants.iter().flatten())
        .map(|re| u32::from(re.is_match(lowered)))
        .sum()
}

/// Punctuation and emoticon bonuses, computed on the original text
fn heuristic_bonus(emotion: Emotion, text: &str) -> u32 {
    match emotion {
        Emotion::Excited => occurrences(text, &["!"]) * 2,
        Emotion::Happy => occurrences(text, HAPPY_EMOTICONS),
        Emotion::Sad => occurrences(text, SAD_EMOTICONS),
        Emotion::Angry => {
            let shouting = text.contains("!!!") || is_all_caps(text);
            occurrences(text, ANGRY_EMOTICONS) + u32::from(shouting)
        }
        Emotion::Tired | Emotion::Neutral => 0,
    }
}

fn occurrences(text: &str, needles: &[&str]) -> u32 {
    let count: usize = needles.iter().map(|n| text.matches(n).count()).sum();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// At least one cased letter and no lower-case ones
fn is_all_caps(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}
