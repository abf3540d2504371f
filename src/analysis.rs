//! Uniform analysis result and the adapter that builds it.
//!
//! Both backend families hand their output to [`AnalysisResult::from_output`]
//! through the [`BackendOutput`] capability interface, so nothing downstream
//! needs to know which family produced a result.

use crate::defaults::{UNIFIED_CONFIDENCE, UNIFIED_RESIDUAL};
use crate::registry::{AudioEvent, Emotion};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Capabilities every backend output exposes to the adapter.
pub trait BackendOutput {
    fn transcription(&self) -> TranscriptionResult;

    fn emotion(&self) -> EmotionVerdict;

    /// `None` when the backend cannot detect audio events at all.
    fn audio_events(&self) -> Option<Vec<AudioEvent>>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptionResult {
    pub text: String,
    #[serde(rename = "language")]
    pub language_code: String,
    #[serde(rename = "language_name")]
    pub language_display_name: Option<String>,
}

/// Emotion decision with its confidence and per-label distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct EmotionVerdict {
    pub label: Emotion,
    confidence: f32,
    pub raw_identifier: String,
    pub distribution: BTreeMap<String, f32>,
}

impl EmotionVerdict {
    /// Build a verdict, clamping confidence into `[0, 1]`.
    pub fn new(
        label: Emotion,
        confidence: f32,
        raw_identifier: impl Into<String>,
        distribution: BTreeMap<String, f32>,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            label,
            confidence,
            raw_identifier: raw_identifier.into(),
            distribution,
        }
    }

    /// Placeholder verdict for backends that only name an emotion.
    ///
    /// The resolved emotion gets [`UNIFIED_CONFIDENCE`], every other
    /// detectable emotion gets [`UNIFIED_RESIDUAL`]. This is a constant
    /// function of `emotion`, not a measured probability.
    pub fn synthesized(emotion: Emotion) -> Self {
        let mut distribution: BTreeMap<String, f32> = Emotion::detectable()
            .map(|e| (e.identifier().to_ascii_lowercase(), UNIFIED_RESIDUAL))
            .collect();
        let raw = emotion.identifier().to_ascii_lowercase();
        distribution.insert(raw.clone(), UNIFIED_CONFIDENCE);
        Self::new(emotion, UNIFIED_CONFIDENCE, raw, distribution)
    }

    /// Verdict for a clip that produced no output at all.
    pub fn empty() -> Self {
        Self::new(
            Emotion::Neutral,
            0.0,
            Emotion::Neutral.identifier().to_ascii_lowercase(),
            BTreeMap::new(),
        )
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

impl Serialize for EmotionVerdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let display = self.label.display();
        let mut s = serializer.serialize_struct("EmotionVerdict", 6)?;
        s.serialize_field("emotion", display.label)?;
        s.serialize_field("emoji", display.emoji)?;
        s.serialize_field("color", display.color)?;
        s.serialize_field("confidence", &self.confidence)?;
        s.serialize_field("raw_label", &self.raw_identifier)?;
        s.serialize_field("all_probabilities", &self.distribution)?;
        s.end()
    }
}

/// One successful translation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationItem {
    pub language_code: String,
    #[serde(rename = "language_name")]
    pub language_display_name: String,
    #[serde(rename = "flag")]
    pub flag_glyph: String,
    #[serde(rename = "text")]
    pub translated_text: String,
}

/// Response of one `/analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub transcription: TranscriptionResult,
    pub emotion: EmotionVerdict,
    pub audio_events: Option<Vec<AudioEvent>>,
    pub translations: Option<Vec<TranslationItem>>,
}

impl AnalysisResult {
    /// Assemble a result from whatever backend produced the output.
    pub fn from_output(output: &dyn BackendOutput) -> Self {
        Self {
            transcription: output.transcription(),
            emotion: output.emotion(),
            audio_events: output.audio_events(),
            translations: None,
        }
    }

    pub fn with_translations(self, translations: Vec<TranslationItem>) -> Self {
        Self {
            translations: Some(translations),
            ..self
        }
    }
}
