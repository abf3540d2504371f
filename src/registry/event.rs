//! Audio event vocabulary reported by the unified backend.

use serde::Serialize;

/// Non-speech sound detected alongside a transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEvent {
    #[serde(rename = "bgm")]
    BackgroundMusic,
    Applause,
    Laughter,
    Crying,
    Coughing,
    Sneezing,
}

impl AudioEvent {
    pub const ALL: [AudioEvent; 6] = [
        AudioEvent::BackgroundMusic,
        AudioEvent::Applause,
        AudioEvent::Laughter,
        AudioEvent::Crying,
        AudioEvent::Coughing,
        AudioEvent::Sneezing,
    ];

    /// Wire identifier, e.g. `"laughter"`.
    pub fn identifier(self) -> &'static str {
        match self {
            AudioEvent::BackgroundMusic => "bgm",
            AudioEvent::Applause => "applause",
            AudioEvent::Laughter => "laughter",
            AudioEvent::Crying => "crying",
            AudioEvent::Coughing => "coughing",
            AudioEvent::Sneezing => "sneezing",
        }
    }

    /// Match a tag identifier against the vocabulary, ignoring case.
    ///
    /// SenseVoice spells some events as nouns (`Cry`, `Cough`, `Sneeze`);
    /// those are accepted as aliases.
    pub fn from_identifier(identifier: &str) -> Option<AudioEvent> {
        let lower = identifier.trim().to_ascii_lowercase();
        let event = match lower.as_str() {
            "bgm" => AudioEvent::BackgroundMusic,
            "applause" => AudioEvent::Applause,
            "laughter" => AudioEvent::Laughter,
            "crying" | "cry" => AudioEvent::Crying,
            "coughing" | "cough" => AudioEvent::Coughing,
            "sneezing" | "sneeze" => AudioEvent::Sneezing,
            _ => return None,
        };
        Some(event)
    }
}
