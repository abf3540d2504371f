//! Two-model backend: separate ASR and emotion classifier.

use crate::analysis::{BackendOutput, EmotionVerdict, TranscriptionResult};
use crate::audio::AudioClip;
use crate::backend::{
    AnalysisBackend, AsrModel, EmotionModel, EmotionScores, Mode, RawOutput, Slot, Transcript,
};
use crate::error::Result;
use crate::registry::{AudioEvent, Emotion};

/// Transcript and classifier scores, passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyOutput {
    pub transcript: Transcript,
    pub scores: EmotionScores,
}

impl BackendOutput for LegacyOutput {
    fn transcription(&self) -> TranscriptionResult {
        TranscriptionResult {
            text: self.transcript.text.trim().to_string(),
            language_code: self.transcript.language.clone(),
            language_display_name: None,
        }
    }

    fn emotion(&self) -> EmotionVerdict {
        EmotionVerdict::new(
            Emotion::resolve(&self.scores.label),
            self.scores.confidence,
            self.scores.label.clone(),
            self.scores.probabilities.clone(),
        )
    }

    fn audio_events(&self) -> Option<Vec<AudioEvent>> {
        None
    }
}

/// Backend pairing an [`AsrModel`] with an [`EmotionModel`].
///
/// Usable only when both slots are ready.
pub struct LegacyBackend {
    asr: Slot<dyn AsrModel>,
    emotion: Slot<dyn EmotionModel>,
}

impl LegacyBackend {
    pub fn new(asr: Box<dyn AsrModel>, emotion: Box<dyn EmotionModel>) -> Self {
        Self {
            asr: Slot::new(asr),
            emotion: Slot::new(emotion),
        }
    }
}

impl AnalysisBackend for LegacyBackend {
    fn mode(&self) -> Mode {
        Mode::Legacy
    }

    fn ensure_loaded(&self) -> Result<()> {
        self.asr.ensure_loaded()?;
        self.emotion.ensure_loaded()
    }

    fn is_ready(&self) -> bool {
        self.asr.is_ready() && self.emotion.is_ready()
    }

    fn analyze(&self, clip: &AudioClip, _language_hint: &str) -> Result<RawOutput> {
        let transcript = self.asr.with(|m| m.transcribe(clip))?;
        let scores = self.emotion.with(|m| m.classify(clip))?;
        tracing::debug!(
            language = %transcript.language,
            label = %scores.label,
            "Legacy backend output"
        );
        Ok(RawOutput::Legacy(LegacyOutput { transcript, scores }))
    }
}
