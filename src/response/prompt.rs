//! System prompt construction

use crate::classify::{Emotion, Language};

/// Who the assistant is
#[derive(Debug, Clone)]
pub struct Persona {
    pub name: String,
    pub description: String,
}

/// Behavioural guidance for replying to someone in `emotion`
#[must_use]
pub const fn guidelines(emotion: Emotion) -> &'static str {
    match emotion {
        Emotion::Happy => {
            "Share their good mood. Be upbeat and playful, celebrate with them and ask \
             what made the moment special."
        }
        Emotion::Sad => {
            "Be gentle and comforting. Acknowledge the feeling before anything else, \
             offer reassurance and let them know you are there to listen."
        }
        Emotion::Angry => {
            "Stay calm and patient. Validate the frustration without arguing, keep \
             sentences short and help them find a way to settle down."
        }
        Emotion::Excited => {
            "Match their energy. Be enthusiastic, show curiosity about the news and \
             keep the momentum going."
        }
        Emotion::Tired => {
            "Speak softly and keep it brief. Encourage rest, suggest taking a break and \
             avoid asking for effort."
        }
        Emotion::Neutral => {
            "Be warm and natural. Answer helpfully and keep the conversation flowing \
             like a friend would."
        }
    }
}

/// Instruction naming the reply language
#[must_use]
pub const fn language_directive(language: Language) -> &'static str {
    match language {
        Language::Hindi => "Respond in Hindi using Devanagari script.",
        Language::Hinglish => "Respond in Hinglish, mixing Hindi and English naturally.",
        Language::English | Language::Unknown => "Respond in English.",
    }
}

/// Build the system prompt for one reply
#[must_use]
pub fn build_system_prompt(persona: &Persona, language: Language, emotion: Emotion) -> String {
    format!(
        "You are {name}, {description}

The user currently seems {mood}. Keep responses short enough to be spoken aloud, \
one to three sentences, and never use lists or markup.

Response guidelines:
{guidelines}

{directive}",
        name = persona.name,
        description = persona.description,
        mood = emotion.as_str(),
        guidelines = guidelines(emotion),
        directive = language_directive(language),
    )
}
