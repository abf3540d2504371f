//! Translation fan-out across several target languages.
//!
//! One source text goes to the translator once per distinct target. A target
//! that fails does not affect the others; callers get an outcome per target
//! and decide what to log.

use crate::analysis::TranslationItem;
use crate::backend::{Slot, TranslationModel};
use crate::defaults::FALLBACK_FLAG;
use crate::error::{Result, VoxError};
use crate::registry::get_language;
use crate::registry::language::source_translation_code;
use std::collections::HashSet;

/// Why a requested target was not sent to the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SameAsSource,
    Duplicate,
}

/// Result for one requested target, in request order.
#[derive(Debug)]
pub enum TargetOutcome {
    Translated(TranslationItem),
    Skipped { target: String, reason: SkipReason },
    Failed { target: String, error: VoxError },
}

/// A target after source and duplicate filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedTarget {
    Translate { code: String, internal_code: String },
    Skip { code: String, reason: SkipReason },
}

/// Filter targets in order: drop the source language and repeats.
pub fn plan_targets<S: AsRef<str>>(source: &str, targets: &[S]) -> Vec<PlannedTarget> {
    let mut seen = HashSet::new();
    targets
        .iter()
        .map(|target| {
            let code = target.as_ref().to_string();
            if code == source {
                PlannedTarget::Skip {
                    code,
                    reason: SkipReason::SameAsSource,
                }
            } else if !seen.insert(code.clone()) {
                PlannedTarget::Skip {
                    code,
                    reason: SkipReason::Duplicate,
                }
            } else {
                let internal_code = target_translation_code(&code);
                PlannedTarget::Translate {
                    code,
                    internal_code,
                }
            }
        })
        .collect()
}

/// Internal code for a target; unknown codes pass through unchanged.
pub fn target_translation_code(code: &str) -> String {
    get_language(code)
        .map(|l| l.internal_translation_code.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Attach registry metadata to a translated text.
pub fn enrich(code: &str, translated_text: String) -> TranslationItem {
    let (name, flag) = match get_language(code) {
        Some(info) => (info.display_name.to_string(), info.flag_glyph.to_string()),
        None => (code.to_string(), FALLBACK_FLAG.to_string()),
    };
    TranslationItem {
        language_code: code.to_string(),
        language_display_name: name,
        flag_glyph: flag,
        translated_text,
    }
}

/// One translator call planned by [`fan_out`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationJob {
    pub code: String,
    pub internal_code: String,
    pub source_internal: &'static str,
}

/// Runs translator work on behalf of [`fan_out`].
///
/// A [`Slot`] runs everything in place. The service wraps the same slot to
/// move each call onto the blocking pool under a deadline.
pub trait TranslationRunner {
    /// Bring the translator to ready.
    fn load(&self) -> impl Future<Output = Result<()>> + Send;

    /// Translate `text` for one job. Never fails as a whole.
    fn translate(
        &self,
        text: &str,
        job: TranslationJob,
    ) -> impl Future<Output = TargetOutcome> + Send;
}

impl TranslationRunner for Slot<dyn TranslationModel> {
    async fn load(&self) -> Result<()> {
        self.ensure_loaded()
    }

    async fn translate(&self, text: &str, job: TranslationJob) -> TargetOutcome {
        translate_one(self, text, &job)
    }
}

/// Translate one job on a loaded translator.
pub fn translate_one(
    translator: &Slot<dyn TranslationModel>,
    text: &str,
    job: &TranslationJob,
) -> TargetOutcome {
    match translator.with(|m| m.translate(text, job.source_internal, &job.internal_code)) {
        Ok(translated) => TargetOutcome::Translated(enrich(&job.code, translated)),
        Err(error) => TargetOutcome::Failed {
            target: job.code.clone(),
            error: match error {
                e @ VoxError::TranslationFailure { .. } => e,
                other => VoxError::TranslationFailure {
                    target: job.code.clone(),
                    message: other.to_string(),
                },
            },
        },
    }
}

/// Translate `text` from `source` into every qualifying target.
///
/// Returns no outcomes when there is no translator or the text is blank.
/// Loads the translator first if needed; only a load failure is an error.
/// Targets run one after another, in request order.
pub async fn fan_out<R, S>(
    translator: Option<&R>,
    text: &str,
    source: &str,
    targets: &[S],
) -> Result<Vec<TargetOutcome>>
where
    R: TranslationRunner,
    S: AsRef<str>,
{
    let Some(translator) = translator else {
        return Ok(Vec::new());
    };
    if text.trim().is_empty() || targets.is_empty() {
        return Ok(Vec::new());
    }

    translator.load().await.map_err(|e| match e {
        e @ VoxError::TranslatorUnavailable { .. } => e,
        other => VoxError::TranslatorUnavailable {
            message: other.to_string(),
        },
    })?;

    let source_internal = source_translation_code(source);
    let mut outcomes = Vec::with_capacity(targets.len());
    for planned in plan_targets(source, targets) {
        let outcome = match planned {
            PlannedTarget::Skip { code, reason } => TargetOutcome::Skipped {
                target: code,
                reason,
            },
            PlannedTarget::Translate {
                code,
                internal_code,
            } => {
                let job = TranslationJob {
                    code,
                    internal_code,
                    source_internal,
                };
                translator.translate(text, job).await
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Keep successful items in order, logging each failure.
pub fn collect_translations(outcomes: Vec<TargetOutcome>) -> Vec<TranslationItem> {
    outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            TargetOutcome::Translated(item) => Some(item),
            TargetOutcome::Skipped { target, reason } => {
                tracing::debug!(target_language = %target, ?reason, "Skipped translation target");
                None
            }
            TargetOutcome::Failed { target, error } => {
                tracing::warn!(target_language = %target, error = %error, "Translation failed");
                None
            }
        })
        .collect()
}

/// Split a comma-separated target list, dropping blanks.
pub fn parse_target_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
