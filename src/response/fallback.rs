//! Canned replies for when the completion backend cannot answer

use rand::seq::SliceRandom;

use crate::classify::Language;

const HINDI: &[&str] = &[
    "माफ़ कीजिए, मैं ठीक से समझ नहीं पाया। क्या आप दोबारा कह सकते हैं?",
    "मुझे अभी थोड़ी दिक्कत हो रही है। एक बार फिर से बताइए?",
    "लगता है मैंने पूरी बात नहीं सुनी। फिर से कहेंगे?",
];

const HINGLISH: &[&str] = &[
    "Sorry, main theek se samajh nahi paaya. Ek baar phir bolo?",
    "Abhi thodi problem ho rahi hai, can you say that again?",
    "Oops, kuch miss ho gaya. Phir se batao na?",
];

const ENGLISH: &[&str] = &[
    "Sorry, I didn't quite catch that. Could you say it again?",
    "I'm having a little trouble right now. Can you repeat that?",
    "Oops, I lost track for a moment. What were you saying?",
];

/// The fixed reply list for a language
#[must_use]
pub const fn replies(language: Language) -> &'static [&'static str] {
    match language {
        Language::Hindi => HINDI,
        Language::Hinglish => HINGLISH,
        Language::English | Language::Unknown => ENGLISH,
    }
}

/// Pick a fallback reply for `language`
#[must_use]
pub fn pick(language: Language) -> &'static str {
    let list = replies(language);
    list.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(ENGLISH[0])
}
