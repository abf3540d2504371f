//! Single-pass backend: one model yields text, emotion and events together.

use crate::analysis::{BackendOutput, EmotionVerdict, TranscriptionResult};
use crate::audio::AudioClip;
use crate::backend::{AnalysisBackend, Mode, RawOutput, Slot, UnifiedModel};
use crate::defaults::{AUTO_LANGUAGE, FALLBACK_DETECTED_LANGUAGE, UNKNOWN_LANGUAGE};
use crate::error::Result;
use crate::parser::{RichParse, parse_rich_output};
use crate::registry::AudioEvent;
use crate::registry::language::transcription_language_name;

/// Output of the unified backend after tag decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum UnifiedOutput {
    Parsed { parse: RichParse, language: String },
    /// The model returned nothing for the clip.
    Empty,
}

impl UnifiedOutput {
    /// Decode raw model text, resolving the language from the model's report
    /// or else the caller's hint.
    pub fn from_raw(raw: &str, reported_language: Option<&str>, hint: &str) -> Self {
        let language = resolve_language(reported_language, hint);
        UnifiedOutput::Parsed {
            parse: parse_rich_output(raw),
            language,
        }
    }
}

fn resolve_language(reported: Option<&str>, hint: &str) -> String {
    let language = reported
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(hint);
    if language.eq_ignore_ascii_case(AUTO_LANGUAGE) {
        FALLBACK_DETECTED_LANGUAGE.to_string()
    } else {
        language.to_string()
    }
}

impl BackendOutput for UnifiedOutput {
    fn transcription(&self) -> TranscriptionResult {
        match self {
            UnifiedOutput::Parsed { parse, language } => TranscriptionResult {
                text: parse.clean_text.clone(),
                language_code: language.clone(),
                language_display_name: Some(
                    transcription_language_name(language)
                        .map(str::to_string)
                        .unwrap_or_else(|| language.clone()),
                ),
            },
            UnifiedOutput::Empty => TranscriptionResult {
                text: String::new(),
                language_code: UNKNOWN_LANGUAGE.to_string(),
                language_display_name: Some("Unknown".to_string()),
            },
        }
    }

    fn emotion(&self) -> EmotionVerdict {
        match self {
            UnifiedOutput::Parsed { parse, .. } => EmotionVerdict::synthesized(parse.emotion),
            UnifiedOutput::Empty => EmotionVerdict::empty(),
        }
    }

    fn audio_events(&self) -> Option<Vec<AudioEvent>> {
        match self {
            UnifiedOutput::Parsed { parse, .. } => Some(parse.events.clone()),
            UnifiedOutput::Empty => Some(Vec::new()),
        }
    }
}

/// Backend wrapping a single [`UnifiedModel`].
pub struct UnifiedBackend {
    slot: Slot<dyn UnifiedModel>,
}

impl UnifiedBackend {
    pub fn new(model: Box<dyn UnifiedModel>) -> Self {
        Self {
            slot: Slot::new(model),
        }
    }
}

impl AnalysisBackend for UnifiedBackend {
    fn mode(&self) -> Mode {
        Mode::Unified
    }

    fn ensure_loaded(&self) -> Result<()> {
        self.slot.ensure_loaded()
    }

    fn is_ready(&self) -> bool {
        self.slot.is_ready()
    }

    fn analyze(&self, clip: &AudioClip, language_hint: &str) -> Result<RawOutput> {
        let generated = self.slot.with(|m| m.generate(clip, language_hint))?;
        let output = match generated {
            Some(rich) => {
                tracing::debug!(raw = %rich.text, "Unified model output");
                UnifiedOutput::from_raw(&rich.text, rich.language.as_deref(), language_hint)
            }
            None => {
                tracing::warn!(clip = %clip.path().display(), "Unified model returned no output");
                UnifiedOutput::Empty
            }
        };
        Ok(RawOutput::Unified(output))
    }
}
