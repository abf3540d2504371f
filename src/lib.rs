//! voxsense - voice analysis orchestration
//!
//! Turns an audio clip into a transcript, an emotion, audio event tags and
//! optional translations, using either a single-pass model or an ASR plus
//! emotion classifier pair.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod analysis;
pub mod audio;
pub mod backend;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod parser;
pub mod registry;
pub mod server;
pub mod service;
pub mod translation;

// Result shape
pub use analysis::{AnalysisResult, BackendOutput, EmotionVerdict, TranscriptionResult, TranslationItem};

// Backends
pub use backend::{AnalysisBackend, BackendManager, Mode, RawOutput};

// Error handling
pub use error::{Result, VoxError};

// Config
pub use config::Config;

// Service facade
pub use service::{ServiceOptions, VoiceService};

/// Build version string with optional git commit hash.
///
/// Returns `"0.2.0+abc1234"` when git hash is available, `"0.2.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
