//! Emotion vocabulary and display metadata.

use serde::Serialize;
use std::fmt;

/// Closed set of emotions the analysis backends can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Emotion {
    Angry,
    Disgust,
    Fearful,
    Happy,
    Neutral,
    Sad,
    Surprised,
    Unknown,
}

/// Display triple shown next to a detected emotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmotionDisplay {
    pub label: &'static str,
    pub emoji: &'static str,
    pub color: &'static str,
}

impl Emotion {
    /// Every emotion, in registry order.
    pub const ALL: [Emotion; 8] = [
        Emotion::Angry,
        Emotion::Disgust,
        Emotion::Fearful,
        Emotion::Happy,
        Emotion::Neutral,
        Emotion::Sad,
        Emotion::Surprised,
        Emotion::Unknown,
    ];

    /// Canonical identifier, as emitted in unified backend tags (`<|HAPPY|>`).
    pub fn identifier(self) -> &'static str {
        match self {
            Emotion::Angry => "ANGRY",
            Emotion::Disgust => "DISGUSTED",
            Emotion::Fearful => "FEARFUL",
            Emotion::Happy => "HAPPY",
            Emotion::Neutral => "NEUTRAL",
            Emotion::Sad => "SAD",
            Emotion::Surprised => "SURPRISED",
            Emotion::Unknown => "UNKNOWN",
        }
    }

    /// Resolve an identifier from either backend family.
    ///
    /// Matching is case-insensitive. The unified tag vocabulary (`DISGUSTED`,
    /// `EMO_UNKNOWN`) and the legacy classifier labels (`disgust`) are both
    /// accepted. Returns `None` for anything outside the registry.
    pub fn from_identifier(identifier: &str) -> Option<Emotion> {
        let upper = identifier.trim().to_ascii_uppercase();
        let emotion = match upper.as_str() {
            "ANGRY" => Emotion::Angry,
            "DISGUSTED" | "DISGUST" => Emotion::Disgust,
            "FEARFUL" => Emotion::Fearful,
            "HAPPY" => Emotion::Happy,
            "NEUTRAL" => Emotion::Neutral,
            "SAD" => Emotion::Sad,
            "SURPRISED" => Emotion::Surprised,
            "UNKNOWN" | "EMO_UNKNOWN" => Emotion::Unknown,
            _ => return None,
        };
        Some(emotion)
    }

    /// Like [`Emotion::from_identifier`], falling back to `Unknown`.
    pub fn resolve(identifier: &str) -> Emotion {
        Self::from_identifier(identifier).unwrap_or(Emotion::Unknown)
    }

    pub fn display(self) -> EmotionDisplay {
        let (label, emoji, color) = match self {
            Emotion::Angry => ("Angry", "😠", "#ff6b6b"),
            Emotion::Disgust => ("Disgust", "🤢", "#a9e34b"),
            Emotion::Fearful => ("Fearful", "😨", "#9775fa"),
            Emotion::Happy => ("Happy", "😊", "#51cf66"),
            Emotion::Neutral => ("Neutral", "😐", "#868e96"),
            Emotion::Sad => ("Sad", "😢", "#748ffc"),
            Emotion::Surprised => ("Surprised", "😲", "#ffd43b"),
            Emotion::Unknown => ("Unknown", "🎭", "#adb5bd"),
        };
        EmotionDisplay {
            label,
            emoji,
            color,
        }
    }

    /// Human label, e.g. "Happy".
    pub fn label(self) -> &'static str {
        self.display().label
    }

    pub fn is_unknown(self) -> bool {
        self == Emotion::Unknown
    }

    /// Emotions a backend can actually report (everything but `Unknown`).
    pub fn detectable() -> impl Iterator<Item = Emotion> {
        Self::ALL.into_iter().filter(|e| !e.is_unknown())
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Emotion {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
