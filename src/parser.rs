//! Decoder for the unified backend's tag-annotated output.
//!
//! SenseVoice-style models emit a single string with inline `<|TAG|>` markers
//! for language, emotion and audio events, e.g.
//! `<|en|><|HAPPY|><|Speech|><|withitn|>Hello there.` This module splits that
//! stream into clean text, one resolved emotion, and the detected events.

use crate::registry::{AudioEvent, Emotion};
use regex::Regex;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"<\|([A-Za-z_]+)\|>"));

/// Decoded form of one annotated output string.
#[derive(Debug, Clone, PartialEq)]
pub struct RichParse {
    /// Transcript with every tag removed and whitespace normalized.
    pub clean_text: String,
    /// Last emotion tag in document order, `Neutral` if there was none.
    pub emotion: Emotion,
    /// Event tags in order of appearance, duplicates kept.
    pub events: Vec<AudioEvent>,
}

/// Parse an annotated output string.
pub fn parse_rich_output(raw: &str) -> RichParse {
    let Ok(re) = TAG_RE.as_ref() else {
        // The pattern is a literal and always compiles.
        return RichParse {
            clean_text: normalize_whitespace(raw),
            emotion: Emotion::Neutral,
            events: Vec::new(),
        };
    };

    let mut emotion = Emotion::Neutral;
    let mut events = Vec::new();

    for caps in re.captures_iter(raw) {
        let identifier = &caps[1];
        if let Some(found) = Emotion::from_identifier(identifier) {
            emotion = found;
        } else if let Some(event) = AudioEvent::from_identifier(identifier) {
            events.push(event);
        }
    }

    let stripped = re.replace_all(raw, "");

    RichParse {
        clean_text: normalize_whitespace(&stripped),
        emotion,
        events,
    }
}

/// Collapse whitespace runs to a single space and trim the ends.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
