//! Async facade over the backend manager, shared by the HTTP server and CLI.
//!
//! Every collaborator call is synchronous, so it runs on tokio's blocking
//! pool. Inference calls additionally honor the configured deadline.

use crate::analysis::{AnalysisResult, TranslationItem};
use crate::audio::AudioClip;
use crate::backend::{BackendManager, HealthSnapshot, Mode};
use crate::config::Config;
use crate::error::{Result, VoxError};
use crate::registry::language::{fallback_languages, supported_languages};
use crate::registry::{Emotion, EmotionDisplay, LanguageInfo};
use crate::translation::{
    self, TargetOutcome, TranslationJob, TranslationRunner, collect_translations,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Behavior switches taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub prefer_unified: bool,
    pub inference_timeout: Option<Duration>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            prefer_unified: true,
            inference_timeout: None,
        }
    }
}

/// Shared analysis service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct VoiceService {
    manager: Arc<BackendManager>,
    options: ServiceOptions,
}

impl VoiceService {
    pub fn new(manager: BackendManager, options: ServiceOptions) -> Self {
        Self {
            manager: Arc::new(manager),
            options,
        }
    }

    /// Build the service and its collaborators from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let options = ServiceOptions {
            prefer_unified: config.backends.prefer_unified,
            inference_timeout: config.limits.inference_timeout()?,
        };
        Ok(Self::new(build_manager(config), options))
    }

    pub fn manager(&self) -> &BackendManager {
        &self.manager
    }

    async fn run_blocking<T, F>(
        &self,
        limit: Option<Duration>,
        task: F,
        on_timeout: impl FnOnce(Duration) -> VoxError,
    ) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let handle = tokio::task::spawn_blocking(task);
        let joined = match limit {
            Some(limit) => match tokio::time::timeout(limit, handle).await {
                Ok(joined) => joined,
                Err(_) => return Err(on_timeout(limit)),
            },
            None => handle.await,
        };
        joined.map_err(|e| VoxError::analysis(format!("blocking task failed: {}", e)))?
    }

    /// Make sure an analysis backend is active, selecting one if needed.
    pub async fn ensure_backend(&self) -> Result<Mode> {
        if let Some(mode) = self.manager.active_mode()
            && self.manager.is_ready(mode)
        {
            return Ok(mode);
        }
        let manager = self.manager.clone();
        let prefer_unified = self.options.prefer_unified;
        self.run_blocking(
            None,
            move || manager.select_active_mode(prefer_unified),
            |_| VoxError::analysis("backend selection timed out"),
        )
        .await
    }

    /// Load backends ahead of the first request. Failures are logged only;
    /// requests retry the load later.
    pub async fn warm_up(&self, eager_translator: bool) {
        match self.ensure_backend().await {
            Ok(mode) => tracing::info!(%mode, "Analysis backend ready"),
            Err(e) => tracing::error!(error = %e, "No analysis backend ready yet"),
        }

        if eager_translator && self.manager.translation_enabled() {
            let manager = self.manager.clone();
            let loaded = self
                .run_blocking(
                    None,
                    move || manager.ensure_translator().map(|_| ()),
                    |_| VoxError::analysis("translator load timed out"),
                )
                .await;
            match loaded {
                Ok(()) => tracing::info!("Translator ready"),
                Err(e) => tracing::warn!(error = %e, "Translator not ready, will retry on first use"),
            }
        }
    }

    /// Analyze one clip, translating the transcript when `targets` is not empty.
    pub async fn analyze(
        &self,
        clip: AudioClip,
        language: &str,
        targets: &[String],
    ) -> Result<AnalysisResult> {
        self.ensure_backend().await?;

        let manager = self.manager.clone();
        let hint = language.to_string();
        let raw = self
            .run_blocking(
                self.options.inference_timeout,
                move || manager.analyze(&clip, &hint),
                |limit| {
                    VoxError::analysis(format!(
                        "inference timed out after {}",
                        humantime::format_duration(limit)
                    ))
                },
            )
            .await?;

        let result = AnalysisResult::from_output(&raw);
        tracing::info!(
            mode = %raw.mode(),
            language = %result.transcription.language_code,
            emotion = %result.emotion.label,
            chars = result.transcription.text.len(),
            "Analysis complete"
        );

        if targets.is_empty() || !self.manager.translation_enabled() {
            return Ok(result);
        }

        let text = result.transcription.text.clone();
        let source = result.transcription.language_code.clone();
        let translations = match self.translate_outcomes(&text, &source, targets).await {
            Ok(outcomes) => collect_translations(outcomes),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping translations");
                Vec::new()
            }
        };
        Ok(result.with_translations(translations))
    }

    /// Translate text into every qualifying target.
    ///
    /// Fails only when the translator is missing or cannot load.
    pub async fn translate(
        &self,
        text: &str,
        source: &str,
        targets: &[String],
    ) -> Result<Vec<TranslationItem>> {
        let manager = self.manager.clone();
        self.run_blocking(
            None,
            move || manager.ensure_translator().map(|_| ()),
            |_| VoxError::analysis("translator load timed out"),
        )
        .await?;

        let outcomes = self.translate_outcomes(text, source, targets).await?;
        Ok(collect_translations(outcomes))
    }

    async fn translate_outcomes(
        &self,
        text: &str,
        source: &str,
        targets: &[String],
    ) -> Result<Vec<TargetOutcome>> {
        let runner = BlockingTranslator { service: self };
        let runner = self.manager.translation_enabled().then_some(&runner);
        translation::fan_out(runner, text, source, targets).await
    }

    pub fn health(&self) -> HealthSnapshot {
        self.manager.health()
    }

    /// Translation targets, or a short static list without a translator.
    pub fn languages(&self) -> Vec<&'static LanguageInfo> {
        if self.manager.translation_enabled() {
            supported_languages()
        } else {
            fallback_languages()
        }
    }

    /// Emotion display table keyed by canonical identifier.
    pub fn emotions(&self) -> BTreeMap<&'static str, EmotionDisplay> {
        Emotion::ALL
            .iter()
            .map(|e| (e.identifier(), e.display()))
            .collect()
    }
}

/// Translator work moved onto the blocking pool, each call under the
/// inference deadline.
struct BlockingTranslator<'a> {
    service: &'a VoiceService,
}

impl TranslationRunner for BlockingTranslator<'_> {
    async fn load(&self) -> Result<()> {
        let manager = self.service.manager.clone();
        self.service
            .run_blocking(
                None,
                move || manager.ensure_translator().map(|_| ()),
                |_| VoxError::analysis("translator load timed out"),
            )
            .await
    }

    async fn translate(&self, text: &str, job: TranslationJob) -> TargetOutcome {
        let manager = self.service.manager.clone();
        let text = text.to_string();
        let target = job.code.clone();
        let timeout_target = job.code.clone();
        self.service
            .run_blocking(
                self.service.options.inference_timeout,
                move || match manager.translator() {
                    Some(slot) => Ok(translation::translate_one(slot, &text, &job)),
                    None => Err(VoxError::TranslatorUnavailable {
                        message: "translation is not enabled".to_string(),
                    }),
                },
                move |limit| VoxError::TranslationFailure {
                    target: timeout_target,
                    message: format!("timed out after {}", humantime::format_duration(limit)),
                },
            )
            .await
            .unwrap_or_else(|error| TargetOutcome::Failed { target, error })
    }
}

/// Wire collaborators named in the configuration into a manager.
pub fn build_manager(config: &Config) -> BackendManager {
    #[allow(unused_mut)]
    let mut manager = BackendManager::new();

    #[cfg(feature = "remote")]
    {
        use crate::backend::remote::{RemoteAsr, RemoteEmotion, RemoteTranslator, RemoteUnified};
        let timeout = config.backends.request_timeout();

        if let Some(url) = &config.backends.unified_url {
            manager = manager.with_unified(Box::new(RemoteUnified::new(url, timeout)));
        }

        if let Some(emotion_url) = &config.backends.emotion_url {
            let emotion = Box::new(RemoteEmotion::new(emotion_url, timeout));
            match local_asr(config) {
                Some(asr) => manager = manager.with_legacy(asr, emotion),
                None => {
                    if let Some(asr_url) = &config.backends.asr_url {
                        manager = manager
                            .with_legacy(Box::new(RemoteAsr::new(asr_url, timeout)), emotion);
                    }
                }
            }
        }

        if config.translation.enabled
            && let Some(url) = &config.translation.url
        {
            manager = manager.with_translator(Box::new(RemoteTranslator::new(url, timeout)));
        }
    }

    #[cfg(not(feature = "remote"))]
    if config.backends.unified_url.is_some()
        || config.backends.emotion_url.is_some()
        || config.translation.url.is_some()
    {
        tracing::warn!("Sidecar URLs configured but the `remote` feature is disabled");
    }

    tracing::debug!(?manager, use_gpu = config.backends.use_gpu, "Backends configured");
    manager
}

#[cfg(all(feature = "remote", feature = "whisper"))]
fn local_asr(config: &Config) -> Option<Box<dyn crate::backend::AsrModel>> {
    use crate::backend::whisper::{WhisperAsr, WhisperConfig};
    config.backends.whisper_model.as_ref().map(|path| {
        Box::new(WhisperAsr::new(WhisperConfig {
            model_path: path.clone(),
            use_gpu: config.backends.use_gpu,
            threads: None,
        })) as Box<dyn crate::backend::AsrModel>
    })
}

#[cfg(all(feature = "remote", not(feature = "whisper")))]
fn local_asr(config: &Config) -> Option<Box<dyn crate::backend::AsrModel>> {
    if config.backends.whisper_model.is_some() {
        tracing::warn!("whisper_model is set but the `whisper` feature is disabled");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{MockAsr, MockEmotion, MockTranslator, MockUnified};

    fn clip() -> AudioClip {
        AudioClip::new("/tmp/voxsense-test.wav")
    }

    fn targets(codes: &[&str]) -> Vec<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn service(manager: BackendManager) -> VoiceService {
        VoiceService::new(manager, ServiceOptions::default())
    }

    #[tokio::test]
    async fn test_analyze_selects_backend_lazily() {
        let svc = service(
            BackendManager::new().with_unified(Box::new(
                MockUnified::new("sensevoice").with_response("Hello <|HAPPY|> world <|laughter|>", None),
            )),
        );
        assert_eq!(svc.manager().active_mode(), None);

        let result = svc.analyze(clip(), "auto", &[]).await.unwrap();
        assert_eq!(result.transcription.text, "Hello world");
        assert_eq!(result.transcription.language_code, "en");
        assert_eq!(result.emotion.label, Emotion::Happy);
        assert_eq!(result.translations, None);
        assert_eq!(svc.manager().active_mode(), Some(Mode::Unified));
    }

    #[tokio::test]
    async fn test_analyze_with_inline_translation() {
        let svc = service(
            BackendManager::new()
                .with_unified(Box::new(
                    MockUnified::new("sensevoice").with_response("<|SAD|>Hello", Some("en")),
                ))
                .with_translator(Box::new(
                    MockTranslator::new("nllb").with_failing_target("spa_Latn"),
                )),
        );

        let result = svc
            .analyze(clip(), "auto", &targets(&["en", "es", "fr"]))
            .await
            .unwrap();
        let translations = result.translations.unwrap();
        assert_eq!(translations.len(), 1);
        assert_eq!(translations[0].language_code, "fr");
        assert_eq!(translations[0].translated_text, "[fra_Latn] Hello");
    }

    #[tokio::test]
    async fn test_translator_load_failure_degrades_on_analyze() {
        let svc = service(
            BackendManager::new()
                .with_unified(Box::new(MockUnified::new("sensevoice")))
                .with_translator(Box::new(MockTranslator::new("nllb").with_load_failure())),
        );

        let result = svc.analyze(clip(), "auto", &targets(&["fr"])).await.unwrap();
        assert_eq!(result.translations, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_no_translator_leaves_translations_absent() {
        let svc = service(BackendManager::new().with_unified(Box::new(MockUnified::new("sv"))));
        let result = svc.analyze(clip(), "auto", &targets(&["fr"])).await.unwrap();
        assert_eq!(result.translations, None);
    }

    #[tokio::test]
    async fn test_analyze_falls_back_to_legacy() {
        let svc = service(
            BackendManager::new()
                .with_unified(Box::new(MockUnified::new("sensevoice").with_load_failure()))
                .with_legacy(
                    Box::new(MockAsr::new("whisper").with_response("hola", "es")),
                    Box::new(MockEmotion::new("wav2vec2").with_label("happy", 0.8)),
                ),
        );
        let result = svc.analyze(clip(), "auto", &[]).await.unwrap();
        assert_eq!(result.transcription.language_code, "es");
        assert_eq!(result.audio_events, None);
        assert_eq!(svc.health().active_mode, Some(Mode::Legacy));
    }

    #[tokio::test]
    async fn test_analyze_without_backend_is_unavailable() {
        let svc = service(BackendManager::new());
        let err = svc.analyze(clip(), "auto", &[]).await.unwrap_err();
        assert!(matches!(err, VoxError::NoBackendAvailable { .. }));
    }

    #[tokio::test]
    async fn test_inference_timeout() {
        let svc = VoiceService::new(
            BackendManager::new().with_unified(Box::new(
                MockUnified::new("sensevoice").with_delay(Duration::from_millis(500)),
            )),
            ServiceOptions {
                prefer_unified: true,
                inference_timeout: Some(Duration::from_millis(50)),
            },
        );
        let err = svc.analyze(clip(), "auto", &[]).await.unwrap_err();
        assert!(matches!(err, VoxError::AnalysisFailure { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_translation_deadline_is_per_target() {
        let svc = VoiceService::new(
            BackendManager::new()
                .with_unified(Box::new(MockUnified::new("sensevoice")))
                .with_translator(Box::new(
                    MockTranslator::new("nllb")
                        .with_slow_target("fra_Latn", Duration::from_millis(500)),
                )),
            ServiceOptions {
                prefer_unified: true,
                inference_timeout: Some(Duration::from_millis(100)),
            },
        );

        let items = svc
            .translate("Hello", "en", &targets(&["de", "en", "fr", "de"]))
            .await
            .unwrap();
        let codes: Vec<&str> = items.iter().map(|i| i.language_code.as_str()).collect();
        assert_eq!(codes, vec!["de"]);
    }

    #[tokio::test]
    async fn test_translate_requires_translator() {
        let svc = service(BackendManager::new());
        let err = svc
            .translate("Hello", "en", &targets(&["fr"]))
            .await
            .unwrap_err();
        assert!(matches!(err, VoxError::TranslatorUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_translate_blank_text_is_empty() {
        let svc = service(BackendManager::new().with_translator(Box::new(MockTranslator::new("nllb"))));
        let items = svc.translate("  ", "en", &targets(&["fr"])).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_warm_up_loads_eagerly() {
        let translator = MockTranslator::new("nllb");
        let loads = translator.load_counter();
        let svc = service(
            BackendManager::new()
                .with_unified(Box::new(MockUnified::new("sensevoice")))
                .with_translator(Box::new(translator)),
        );
        svc.warm_up(true).await;
        assert!(svc.health().models_loaded);
        assert_eq!(loads.count(), 1);
    }

    #[test]
    fn test_languages_fallback_without_translator() {
        let svc = service(BackendManager::new());
        assert_eq!(svc.languages().len(), 7);

        let svc = service(BackendManager::new().with_translator(Box::new(MockTranslator::new("nllb"))));
        assert!(svc.languages().len() > 7);
    }

    #[test]
    fn test_emotion_table() {
        let table = service(BackendManager::new()).emotions();
        assert_eq!(table.len(), 8);
        assert_eq!(table["HAPPY"].emoji, "😊");
        assert_eq!(table["DISGUSTED"].label, "Disgust");
    }

    #[test]
    fn test_build_manager_from_empty_config() {
        let manager = build_manager(&Config::default());
        assert!(!manager.translation_enabled());
        assert!(manager.select_active_mode(true).is_err());
    }
}
