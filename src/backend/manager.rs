//! Owns the configured backends and decides which one is active.

use crate::audio::AudioClip;
use crate::backend::{
    AnalysisBackend, AsrModel, EmotionModel, LegacyBackend, Mode, RawOutput, Slot,
    TranslationModel, UnifiedBackend, UnifiedModel,
};
use crate::error::{Result, VoxError};
use serde::Serialize;
use std::sync::{Mutex, PoisonError, RwLock};

/// Status facts reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub models_loaded: bool,
    pub sensevoice_enabled: bool,
    pub translation_enabled: bool,
    pub active_mode: Option<Mode>,
}

/// Backend lifecycle manager.
///
/// Holds up to two analysis backends plus an independent translator slot.
/// Nothing is loaded until [`BackendManager::select_active_mode`] or
/// [`BackendManager::ensure_translator`] is called.
#[derive(Default)]
pub struct BackendManager {
    unified: Option<UnifiedBackend>,
    legacy: Option<LegacyBackend>,
    translator: Option<Slot<dyn TranslationModel>>,
    /// Written only once the chosen backend is ready.
    active: RwLock<Option<Mode>>,
    /// Held for a whole selection, including loads.
    selecting: Mutex<()>,
}

impl BackendManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unified(mut self, model: Box<dyn UnifiedModel>) -> Self {
        self.unified = Some(UnifiedBackend::new(model));
        self
    }

    pub fn with_legacy(mut self, asr: Box<dyn AsrModel>, emotion: Box<dyn EmotionModel>) -> Self {
        self.legacy = Some(LegacyBackend::new(asr, emotion));
        self
    }

    pub fn with_translator(mut self, model: Box<dyn TranslationModel>) -> Self {
        self.translator = Some(Slot::new(model));
        self
    }

    fn backend(&self, mode: Mode) -> Option<&dyn AnalysisBackend> {
        match mode {
            Mode::Unified => self.unified.as_ref().map(|b| b as &dyn AnalysisBackend),
            Mode::Legacy => self.legacy.as_ref().map(|b| b as &dyn AnalysisBackend),
        }
    }

    /// Bring a backend to ready and make it the active one.
    ///
    /// With `prefer_unified`, the unified backend is tried first and any
    /// failure falls back to the legacy pair. An already active, ready mode is
    /// returned as is.
    pub fn select_active_mode(&self, prefer_unified: bool) -> Result<Mode> {
        if let Some(mode) = self.ready_mode() {
            return Ok(mode);
        }

        let _selecting = self
            .selecting
            .lock()
            .map_err(|_| VoxError::analysis("backend selection lock poisoned"))?;

        // Another caller may have finished while we waited.
        if let Some(mode) = self.ready_mode() {
            return Ok(mode);
        }

        let mut reasons = Vec::new();

        if prefer_unified {
            match &self.unified {
                Some(backend) => match backend.ensure_loaded() {
                    Ok(()) => {
                        tracing::info!("Using unified analysis backend");
                        self.set_active(Mode::Unified);
                        return Ok(Mode::Unified);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Unified backend unavailable, falling back to legacy");
                        reasons.push(format!("unified: {}", e));
                    }
                },
                None => {
                    tracing::warn!("Unified backend not configured, falling back to legacy");
                    reasons.push("unified: not configured".to_string());
                }
            }
        }

        match &self.legacy {
            Some(backend) => match backend.ensure_loaded() {
                Ok(()) => {
                    tracing::info!("Using legacy analysis backend");
                    self.set_active(Mode::Legacy);
                    Ok(Mode::Legacy)
                }
                Err(e) => {
                    reasons.push(format!("legacy: {}", e));
                    Err(VoxError::NoBackendAvailable {
                        message: reasons.join("; "),
                    })
                }
            },
            None => {
                reasons.push("legacy: not configured".to_string());
                Err(VoxError::NoBackendAvailable {
                    message: reasons.join("; "),
                })
            }
        }
    }

    pub fn is_ready(&self, mode: Mode) -> bool {
        self.backend(mode).is_some_and(|b| b.is_ready())
    }

    pub fn active_mode(&self) -> Option<Mode> {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn ready_mode(&self) -> Option<Mode> {
        self.active_mode().filter(|&mode| self.is_ready(mode))
    }

    fn set_active(&self, mode: Mode) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(mode);
    }

    /// Run the active backend on a clip.
    pub fn analyze(&self, clip: &AudioClip, language_hint: &str) -> Result<RawOutput> {
        let backend = self
            .active_mode()
            .and_then(|mode| self.backend(mode))
            .ok_or_else(|| VoxError::ModelNotLoaded {
                model: "analysis backend".to_string(),
            })?;
        backend.analyze(clip, language_hint)
    }

    pub fn translator(&self) -> Option<&Slot<dyn TranslationModel>> {
        self.translator.as_ref()
    }

    pub fn translation_enabled(&self) -> bool {
        self.translator.is_some()
    }

    /// Load the translator if it is configured and not yet ready.
    pub fn ensure_translator(&self) -> Result<&Slot<dyn TranslationModel>> {
        let slot = self
            .translator
            .as_ref()
            .ok_or_else(|| VoxError::TranslatorUnavailable {
                message: "translation is not enabled".to_string(),
            })?;
        slot.ensure_loaded()
            .map_err(|e| VoxError::TranslatorUnavailable {
                message: e.to_string(),
            })?;
        Ok(slot)
    }

    /// Status only; never waits on a load in progress.
    pub fn health(&self) -> HealthSnapshot {
        let active_mode = self.active_mode();
        HealthSnapshot {
            models_loaded: active_mode.is_some_and(|mode| self.is_ready(mode)),
            sensevoice_enabled: active_mode == Some(Mode::Unified),
            translation_enabled: self.translation_enabled(),
            active_mode,
        }
    }
}

impl std::fmt::Debug for BackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendManager")
            .field("unified", &self.unified.is_some())
            .field("legacy", &self.legacy.is_some())
            .field("translator", &self.translator)
            .field("active", &self.active_mode())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockAsr, MockEmotion, MockTranslator, MockUnified};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn legacy_pair() -> (Box<dyn AsrModel>, Box<dyn EmotionModel>) {
        (
            Box::new(MockAsr::new("whisper")),
            Box::new(MockEmotion::new("wav2vec2")),
        )
    }

    #[test]
    fn test_prefers_unified_when_it_loads() {
        let (asr, emo) = legacy_pair();
        let manager = BackendManager::new()
            .with_unified(Box::new(MockUnified::new("sensevoice")))
            .with_legacy(asr, emo);

        assert_eq!(manager.select_active_mode(true).unwrap(), Mode::Unified);
        assert!(manager.is_ready(Mode::Unified));
        assert!(!manager.is_ready(Mode::Legacy));
    }

    #[test]
    fn test_unified_load_failure_falls_back_to_legacy() {
        let (asr, emo) = legacy_pair();
        let manager = BackendManager::new()
            .with_unified(Box::new(MockUnified::new("sensevoice").with_load_failure()))
            .with_legacy(asr, emo);

        assert_eq!(manager.select_active_mode(true).unwrap(), Mode::Legacy);
        assert_eq!(manager.active_mode(), Some(Mode::Legacy));
    }

    #[test]
    fn test_without_preference_uses_legacy() {
        let (asr, emo) = legacy_pair();
        let unified = MockUnified::new("sensevoice");
        let unified_loads = unified.load_counter();
        let manager = BackendManager::new()
            .with_unified(Box::new(unified))
            .with_legacy(asr, emo);

        assert_eq!(manager.select_active_mode(false).unwrap(), Mode::Legacy);
        assert_eq!(unified_loads.count(), 0);
    }

    #[test]
    fn test_repeated_selection_does_not_reload() {
        let unified = MockUnified::new("sensevoice");
        let loads = unified.load_counter();
        let manager = BackendManager::new().with_unified(Box::new(unified));

        assert_eq!(manager.select_active_mode(true).unwrap(), Mode::Unified);
        assert_eq!(manager.select_active_mode(true).unwrap(), Mode::Unified);
        assert_eq!(manager.select_active_mode(false).unwrap(), Mode::Unified);
        assert_eq!(loads.count(), 1);
    }

    #[test]
    fn test_nothing_loads_is_no_backend_available() {
        let manager = BackendManager::new()
            .with_unified(Box::new(MockUnified::new("sensevoice").with_load_failure()))
            .with_legacy(
                Box::new(MockAsr::new("whisper").with_load_failure()),
                Box::new(MockEmotion::new("wav2vec2")),
            );

        let err = manager.select_active_mode(true).unwrap_err();
        assert!(matches!(err, VoxError::NoBackendAvailable { .. }));
        assert!(err.to_string().contains("unified"));
        assert!(err.to_string().contains("legacy"));
        assert_eq!(manager.active_mode(), None);
    }

    #[test]
    fn test_empty_manager_is_no_backend_available() {
        let err = BackendManager::new().select_active_mode(true).unwrap_err();
        assert!(matches!(err, VoxError::NoBackendAvailable { .. }));
    }

    #[test]
    fn test_analyze_before_selection_is_not_loaded() {
        let manager = BackendManager::new().with_unified(Box::new(MockUnified::new("sensevoice")));
        let err = manager
            .analyze(&AudioClip::new("/tmp/a.wav"), "auto")
            .unwrap_err();
        assert!(matches!(err, VoxError::ModelNotLoaded { .. }));
    }

    #[test]
    fn test_analyze_dispatches_to_active() {
        let (asr, emo) = legacy_pair();
        let manager = BackendManager::new()
            .with_unified(Box::new(MockUnified::new("sensevoice").with_load_failure()))
            .with_legacy(asr, emo);
        manager.select_active_mode(true).unwrap();

        let raw = manager
            .analyze(&AudioClip::new("/tmp/a.wav"), "auto")
            .unwrap();
        assert_eq!(raw.mode(), Mode::Legacy);
    }

    #[test]
    fn test_translator_lazy_load() {
        let translator = MockTranslator::new("nllb");
        let loads = translator.load_counter();
        let manager = BackendManager::new().with_translator(Box::new(translator));

        assert!(manager.translation_enabled());
        assert_eq!(loads.count(), 0);
        manager.ensure_translator().unwrap();
        manager.ensure_translator().unwrap();
        assert_eq!(loads.count(), 1);
    }

    #[test]
    fn test_translator_unavailable() {
        let err = BackendManager::new().ensure_translator().unwrap_err();
        assert!(matches!(err, VoxError::TranslatorUnavailable { .. }));

        let manager = BackendManager::new()
            .with_translator(Box::new(MockTranslator::new("nllb").with_load_failure()));
        let err = manager.ensure_translator().unwrap_err();
        assert!(matches!(err, VoxError::TranslatorUnavailable { .. }));
    }

    #[test]
    fn test_health_does_not_wait_for_selection() {
        let manager = Arc::new(BackendManager::new().with_unified(Box::new(
            MockUnified::new("sensevoice").with_load_delay(Duration::from_secs(2)),
        )));

        let selecting = {
            let manager = manager.clone();
            std::thread::spawn(move || manager.select_active_mode(true))
        };
        std::thread::sleep(Duration::from_millis(100));

        let start = Instant::now();
        let during = manager.health();
        assert!(
            start.elapsed() < Duration::from_millis(500),
            "health() waited {:?}",
            start.elapsed()
        );
        assert_eq!(during.active_mode, None);
        assert!(!during.models_loaded);

        assert_eq!(selecting.join().unwrap().unwrap(), Mode::Unified);
        assert_eq!(manager.health().active_mode, Some(Mode::Unified));
    }

    #[test]
    fn test_concurrent_selection_loads_once() {
        let unified = MockUnified::new("sensevoice").with_load_delay(Duration::from_millis(200));
        let loads = unified.load_counter();
        let manager = Arc::new(BackendManager::new().with_unified(Box::new(unified)));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let manager = manager.clone();
                std::thread::spawn(move || manager.select_active_mode(true))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), Mode::Unified);
        }
        assert_eq!(loads.count(), 1);
    }

    #[test]
    fn test_health_snapshot() {
        let manager = BackendManager::new()
            .with_unified(Box::new(MockUnified::new("sensevoice")))
            .with_translator(Box::new(MockTranslator::new("nllb")));
        let before = manager.health();
        assert!(!before.models_loaded);
        assert!(!before.sensevoice_enabled);
        assert!(before.translation_enabled);
        assert_eq!(before.active_mode, None);

        manager.select_active_mode(true).unwrap();
        let after = manager.health();
        assert!(after.models_loaded);
        assert!(after.sensevoice_enabled);
        assert_eq!(after.active_mode, Some(Mode::Unified));
    }
}
