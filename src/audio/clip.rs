//! File-backed audio clips and upload validation.

use crate::error::{Result, VoxError};
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// True when a content type is acceptable as an audio upload.
pub fn is_audio_content_type(content_type: &str) -> bool {
    content_type.contains("audio") || content_type.contains("octet-stream")
}

/// File suffix to store an upload under, inferred from its content type.
pub fn suffix_for_content_type(content_type: &str) -> &'static str {
    if content_type.contains("webm") {
        ".webm"
    } else if content_type.contains("ogg") {
        ".ogg"
    } else if content_type.contains("mpeg") || content_type.contains("mp3") {
        ".mp3"
    } else {
        ".wav"
    }
}

/// Reject uploads whose content type is not audio.
pub fn validate_content_type(content_type: &str) -> Result<()> {
    if is_audio_content_type(content_type) {
        Ok(())
    } else {
        Err(VoxError::InvalidInput {
            message: format!("Invalid file type: {}. Expected audio file.", content_type),
        })
    }
}

/// Handle to a complete audio clip on disk.
///
/// Backends receive this handle rather than decoded samples; each one decides
/// how to read the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    path: PathBuf,
}

impl AudioClip {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercase file extension without the dot, if any.
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    pub fn is_wav(&self) -> bool {
        self.extension().as_deref() == Some("wav")
    }

    /// File name to report when uploading the clip elsewhere.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string()
    }
}

/// Upload stored in a temporary file, deleted when dropped.
#[derive(Debug)]
pub struct TempClip {
    path: TempPath,
    clip: AudioClip,
}

impl TempClip {
    /// Validate the content type and persist `bytes` under the inferred suffix.
    pub async fn store(bytes: &[u8], content_type: &str) -> Result<Self> {
        validate_content_type(content_type)?;
        let suffix = suffix_for_content_type(content_type);

        let path = tempfile::Builder::new()
            .prefix("voxsense-")
            .suffix(suffix)
            .tempfile()?
            .into_temp_path();
        tokio::fs::write(&path, bytes).await?;

        let clip = AudioClip::new(path.to_path_buf());
        Ok(Self { path, clip })
    }

    pub fn clip(&self) -> &AudioClip {
        &self.clip
    }

    pub fn len_bytes(&self) -> u64 {
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_inference() {
        assert_eq!(suffix_for_content_type("audio/webm;codecs=opus"), ".webm");
        assert_eq!(suffix_for_content_type("audio/ogg"), ".ogg");
        assert_eq!(suffix_for_content_type("audio/mpeg"), ".mp3");
        assert_eq!(suffix_for_content_type("audio/mp3"), ".mp3");
        assert_eq!(suffix_for_content_type("audio/wav"), ".wav");
        assert_eq!(suffix_for_content_type("application/octet-stream"), ".wav");
    }

    #[test]
    fn test_content_type_sniff() {
        assert!(is_audio_content_type("audio/x-wav"));
        assert!(is_audio_content_type("application/octet-stream"));
        assert!(!is_audio_content_type("text/plain"));
        assert!(!is_audio_content_type("video/mp4"));
        assert!(!is_audio_content_type(""));
    }

    #[test]
    fn test_validate_content_type_error_message() {
        let err = validate_content_type("image/png").unwrap_err();
        assert!(matches!(err, VoxError::InvalidInput { .. }));
        assert!(err.to_string().contains("image/png"));
    }

    #[test]
    fn test_audio_clip_extension() {
        let clip = AudioClip::new("/tmp/voxsense-abc.WAV");
        assert_eq!(clip.extension().as_deref(), Some("wav"));
        assert!(clip.is_wav());
        assert_eq!(clip.file_name(), "voxsense-abc.WAV");
        assert!(!AudioClip::new("/tmp/x.webm").is_wav());
    }

    #[tokio::test]
    async fn test_temp_clip_writes_and_cleans_up() {
        let temp = TempClip::store(b"RIFF....", "audio/ogg").await.unwrap();
        let path = temp.clip().path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("ogg"));
        assert_eq!(temp.len_bytes(), 8);

        drop(temp);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_temp_clip_rejects_non_audio() {
        let result = TempClip::store(b"hello", "text/plain").await;
        assert!(matches!(result, Err(VoxError::InvalidInput { .. })));
    }
}
