//! Audio clip handling: upload storage, validation and WAV decoding.

pub mod clip;
pub mod wav;

pub use clip::{AudioClip, TempClip};
