//! Analysis backends and the collaborator contracts they are built from.
//!
//! A collaborator is anything that wraps a model: a sidecar process reached
//! over HTTP, an in-process Whisper context, or a test mock. Collaborators are
//! synchronous and may block for a long time, so callers run them on a
//! blocking thread.

pub mod legacy;
pub mod manager;
pub mod mock;
#[cfg(feature = "remote")]
pub mod remote;
pub mod slot;
pub mod unified;
#[cfg(feature = "whisper")]
pub mod whisper;

use crate::analysis::{BackendOutput, EmotionVerdict, TranscriptionResult};
use crate::audio::AudioClip;
use crate::error::Result;
use crate::registry::AudioEvent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use legacy::{LegacyBackend, LegacyOutput};
pub use manager::{BackendManager, HealthSnapshot};
pub use slot::{Slot, SlotState};
pub use unified::{UnifiedBackend, UnifiedOutput};

/// Lifecycle shared by every collaborator.
pub trait Model: Send {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Bring the model into a usable state. Called again after a failure.
    fn load(&mut self) -> Result<()>;
}

/// Annotated transcript produced by a unified model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RichTranscript {
    pub text: String,
    /// Language the model reports having detected, if any.
    #[serde(default)]
    pub language: Option<String>,
}

/// Speech model doing ASR, emotion and event detection in one pass.
pub trait UnifiedModel: Model {
    /// `Ok(None)` means the model produced no output for the clip.
    fn generate(&mut self, clip: &AudioClip, language: &str) -> Result<Option<RichTranscript>>;
}

/// Plain transcript from an ASR model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language: String,
}

pub trait AsrModel: Model {
    fn transcribe(&mut self, clip: &AudioClip) -> Result<Transcript>;
}

/// Classifier output: the winning label and the full distribution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EmotionScores {
    pub label: String,
    pub confidence: f32,
    #[serde(default)]
    pub probabilities: BTreeMap<String, f32>,
}

pub trait EmotionModel: Model {
    fn classify(&mut self, clip: &AudioClip) -> Result<EmotionScores>;
}

/// Machine translation between internal (FLORES-200) language codes.
pub trait TranslationModel: Model {
    fn translate(&mut self, text: &str, source: &str, target: &str) -> Result<String>;
}

/// Which backend family answers analysis requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Unified,
    Legacy,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Unified => write!(f, "unified"),
            Mode::Legacy => write!(f, "legacy"),
        }
    }
}

/// A loaded-on-demand backend that turns a clip into raw output.
pub trait AnalysisBackend: Send + Sync {
    fn mode(&self) -> Mode;

    /// Load every collaborator the backend needs. Idempotent once ready.
    fn ensure_loaded(&self) -> Result<()>;

    fn is_ready(&self) -> bool;

    fn analyze(&self, clip: &AudioClip, language_hint: &str) -> Result<RawOutput>;
}

/// Output of either backend family, before adaptation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    Unified(UnifiedOutput),
    Legacy(LegacyOutput),
}

impl RawOutput {
    pub fn mode(&self) -> Mode {
        match self {
            RawOutput::Unified(_) => Mode::Unified,
            RawOutput::Legacy(_) => Mode::Legacy,
        }
    }

    fn inner(&self) -> &dyn BackendOutput {
        match self {
            RawOutput::Unified(output) => output,
            RawOutput::Legacy(output) => output,
        }
    }
}

impl BackendOutput for RawOutput {
    fn transcription(&self) -> TranscriptionResult {
        self.inner().transcription()
    }

    fn emotion(&self) -> EmotionVerdict {
        self.inner().emotion()
    }

    fn audio_events(&self) -> Option<Vec<AudioEvent>> {
        self.inner().audio_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_display_and_serialize() {
        assert_eq!(Mode::Unified.to_string(), "unified");
        assert_eq!(Mode::Legacy.to_string(), "legacy");
        assert_eq!(serde_json::to_value(Mode::Legacy).unwrap(), "legacy");
    }

    #[test]
    fn test_rich_transcript_null_language() {
        let parsed: RichTranscript = serde_json::from_str(r#"{"text":"<|en|>hi"}"#).unwrap();
        assert_eq!(parsed.language, None);
    }

    #[test]
    fn test_emotion_scores_default_distribution() {
        let parsed: EmotionScores =
            serde_json::from_str(r#"{"label":"happy","confidence":0.9}"#).unwrap();
        assert!(parsed.probabilities.is_empty());
    }
}
