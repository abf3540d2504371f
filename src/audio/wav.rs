//! WAV decoding for in-process backends and clip probing.

use crate::error::{Result, VoxError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Sample rate expected by speech models.
pub const MODEL_SAMPLE_RATE: u32 = 16000;

/// Header facts about a WAV clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f32,
}

/// Read a WAV header without decoding samples.
pub fn probe(path: &Path) -> Result<WavInfo> {
    let reader = hound::WavReader::open(path).map_err(|e| VoxError::InvalidInput {
        message: format!("Failed to parse WAV file: {}", e),
    })?;
    let spec = reader.spec();
    Ok(WavInfo {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        duration_secs: reader.duration() as f32 / spec.sample_rate.max(1) as f32,
    })
}

/// Decode a WAV file to 16 kHz mono 16-bit PCM.
pub fn load_pcm16_mono(path: &Path) -> Result<Vec<i16>> {
    let file = File::open(path)?;
    decode_pcm16_mono(BufReader::new(file))
}

/// Decode WAV data from any reader to 16 kHz mono 16-bit PCM.
///
/// Supports arbitrary sample rates; stereo is averaged down to mono.
pub fn decode_pcm16_mono<R: Read>(reader: R) -> Result<Vec<i16>> {
    let mut wav_reader = hound::WavReader::new(reader).map_err(|e| VoxError::InvalidInput {
        message: format!("Failed to parse WAV file: {}", e),
    })?;

    let spec = wav_reader.spec();

    let raw_samples: Vec<i16> = wav_reader
        .samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| VoxError::InvalidInput {
            message: format!("Failed to read WAV samples: {}", e),
        })?;

    let mono_samples = if spec.channels == 2 {
        raw_samples
            .chunks_exact(2)
            .map(|chunk| ((chunk[0] as i32 + chunk[1] as i32) / 2) as i16)
            .collect()
    } else {
        raw_samples
    };

    Ok(resample(&mono_samples, spec.sample_rate, MODEL_SAMPLE_RATE))
}

/// Simple linear interpolation resampling.
fn resample(samples: &[i16], from_rate: u32, to_rate: u32) -> Vec<i16> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let output_len = (samples.len() as f64 / ratio).ceil() as usize;

    (0..output_len)
        .map(|i| {
            let source_pos = i as f64 * ratio;
            let source_idx = (source_pos.floor() as usize).min(samples.len() - 1);
            let fraction = source_pos - source_idx as f64;

            if source_idx + 1 >= samples.len() {
                samples[source_idx]
            } else {
                let left = samples[source_idx] as f64;
                let right = samples[source_idx + 1] as f64;
                (left + (right - left) * fraction) as i16
            }
        })
        .collect()
}
