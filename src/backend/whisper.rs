//! In-process Whisper ASR for the legacy backend.
//!
//! Requires the `whisper` feature and cmake to build:
//!
//! ```bash
//! cargo build --features whisper
//! ```

use crate::audio::AudioClip;
use crate::audio::wav::load_pcm16_mono;
use crate::backend::{AsrModel, Model, Transcript};
use crate::error::{Result, VoxError};
use std::path::PathBuf;
use std::sync::Once;
use whisper_rs::{
    FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters, install_logging_hooks,
};

static LOGGING_HOOKS_INSTALLED: Once = Once::new();

/// Configuration for the Whisper ASR model.
#[derive(Debug, Clone)]
pub struct WhisperConfig {
    pub model_path: PathBuf,
    pub use_gpu: bool,
    /// Number of threads for inference (None = whisper.cpp default)
    pub threads: Option<usize>,
}

/// Whisper ASR collaborator. The context is created in `load()`.
pub struct WhisperAsr {
    config: WhisperConfig,
    context: Option<WhisperContext>,
    name: String,
}

impl std::fmt::Debug for WhisperAsr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperAsr")
            .field("config", &self.config)
            .field("name", &self.name)
            .field("loaded", &self.context.is_some())
            .finish()
    }
}

impl WhisperAsr {
    pub fn new(config: WhisperConfig) -> Self {
        let name = config
            .model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("whisper")
            .to_string();
        Self {
            config,
            context: None,
            name,
        }
    }

    /// Convert i16 PCM to the f32 range whisper expects.
    fn convert_audio(samples: &[i16]) -> Vec<f32> {
        samples
            .iter()
            .map(|&sample| sample as f32 / 32768.0)
            .collect()
    }
}

impl Model for WhisperAsr {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> Result<()> {
        if self.context.is_some() {
            return Ok(());
        }

        LOGGING_HOOKS_INSTALLED.call_once(|| {
            install_logging_hooks();
        });

        let load_error = |message: String| VoxError::ModelLoad {
            model: self.name.clone(),
            message,
        };

        if !self.config.model_path.exists() {
            return Err(load_error(format!(
                "model file not found at {}",
                self.config.model_path.display()
            )));
        }

        let path = self
            .config
            .model_path
            .to_str()
            .ok_or_else(|| load_error("Invalid UTF-8 in model path".to_string()))?;

        let mut context_params = WhisperContextParameters::default();
        context_params.use_gpu(self.config.use_gpu);
        let context = WhisperContext::new_with_params(path, context_params)
            .map_err(|e| load_error(format!("Failed to load Whisper model: {}", e)))?;

        self.context = Some(context);
        Ok(())
    }
}

impl AsrModel for WhisperAsr {
    fn transcribe(&mut self, clip: &AudioClip) -> Result<Transcript> {
        let context = self.context.as_ref().ok_or_else(|| VoxError::ModelNotLoaded {
            model: self.name.clone(),
        })?;

        if !clip.is_wav() {
            return Err(VoxError::analysis(format!(
                "local Whisper only decodes WAV, got {}",
                clip.file_name()
            )));
        }

        let samples = load_pcm16_mono(clip.path()).map_err(VoxError::analysis)?;
        let audio_f32 = Self::convert_audio(&samples);

        let mut state = context
            .create_state()
            .map_err(|e| VoxError::analysis(format!("Failed to create Whisper state: {}", e)))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(None);
        if let Some(threads) = self.config.threads {
            params.set_n_threads(threads as i32);
        }
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);

        state
            .full(params, &audio_f32)
            .map_err(|e| VoxError::analysis(format!("Whisper inference failed: {}", e)))?;

        let lang_id = state.full_lang_id_from_state();
        let language = whisper_rs::get_lang_str(lang_id).unwrap_or("").to_string();

        let mut text = String::new();
        for segment in state.as_iter() {
            text.push_str(&segment.to_string());
        }

        Ok(Transcript {
            text: text.trim().to_string(),
            language,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(path: &str) -> WhisperConfig {
        WhisperConfig {
            model_path: PathBuf::from(path),
            use_gpu: false,
            threads: None,
        }
    }

    #[test]
    fn test_name_from_model_path() {
        assert_eq!(WhisperAsr::new(config("/models/ggml-base.bin")).name(), "ggml-base");
    }

    #[test]
    fn test_load_fails_for_missing_model() {
        let mut asr = WhisperAsr::new(config("/nonexistent/model.bin"));
        let err = asr.load().unwrap_err();
        assert!(matches!(err, VoxError::ModelLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/model.bin"));
    }

    #[test]
    fn test_transcribe_before_load() {
        let mut asr = WhisperAsr::new(config("/nonexistent/model.bin"));
        let err = asr.transcribe(&AudioClip::new("/tmp/a.wav")).unwrap_err();
        assert!(matches!(err, VoxError::ModelNotLoaded { .. }));
    }

    #[test]
    fn test_convert_audio_i16_to_f32() {
        let samples = vec![0i16, 16384, -16384, -32768];
        let converted = WhisperAsr::convert_audio(&samples);
        assert_eq!(converted[0], 0.0);
        assert!((converted[1] - 0.5).abs() < 0.01);
        assert!((converted[2] + 0.5).abs() < 0.01);
        assert_eq!(converted[3], -1.0);
    }
}
