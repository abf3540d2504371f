//! Capability registry: static emotion, audio event and language tables.
//!
//! Everything here is immutable process-wide data, safe to read from any
//! thread without synchronization.

pub mod emotion;
pub mod event;
pub mod language;

pub use emotion::{Emotion, EmotionDisplay};
pub use event::AudioEvent;
pub use language::{LanguageInfo, get_language};
