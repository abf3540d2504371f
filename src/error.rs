//! Error types for voxsense.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Request validation
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // Backend lifecycle
    #[error("Model not loaded: {model}")]
    ModelNotLoaded { model: String },

    #[error("No analysis backend available: {message}")]
    NoBackendAvailable { message: String },

    #[error("Failed to load {model}: {message}")]
    ModelLoad { model: String, message: String },

    // Inference
    #[error("Analysis failed: {message}")]
    AnalysisFailure { message: String },

    // Translation
    #[error("Translation service not available: {message}")]
    TranslatorUnavailable { message: String },

    #[error("Translation to {target} failed: {message}")]
    TranslationFailure { target: String, message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl VoxError {
    /// Wrap any displayable inference error as an `AnalysisFailure`.
    pub fn analysis(message: impl std::fmt::Display) -> Self {
        VoxError::AnalysisFailure {
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VoxError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_invalid_input_display() {
        let error = VoxError::InvalidInput {
            message: "Invalid file type: text/plain. Expected audio file.".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid input: Invalid file type: text/plain. Expected audio file."
        );
    }

    #[test]
    fn test_model_not_loaded_display() {
        let error = VoxError::ModelNotLoaded {
            model: "analysis backend".to_string(),
        };
        assert_eq!(error.to_string(), "Model not loaded: analysis backend");
    }

    #[test]
    fn test_model_load_display() {
        let error = VoxError::ModelLoad {
            model: "sensevoice".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to load sensevoice: connection refused"
        );
    }

    #[test]
    fn test_translation_failure_display() {
        let error = VoxError::TranslationFailure {
            target: "es".to_string(),
            message: "out of memory".to_string(),
        };
        assert_eq!(error.to_string(), "Translation to es failed: out of memory");
    }

    #[test]
    fn test_analysis_helper() {
        let error = VoxError::analysis("decoder crashed");
        assert!(matches!(error, VoxError::AnalysisFailure { .. }));
        assert_eq!(error.to_string(), "Analysis failed: decoder crashed");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: VoxError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: VoxError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<VoxError>();
        assert_sync::<VoxError>();
    }
}
