use crate::defaults;
use crate::error::{Result, VoxError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub backends: BackendsConfig,
    pub translation: TranslationConfig,
    pub limits: LimitsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

/// Analysis backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendsConfig {
    /// Try the single-pass backend before the ASR + classifier pair
    pub prefer_unified: bool,
    pub use_gpu: bool,
    pub unified_url: Option<String>,
    pub asr_url: Option<String>,
    pub emotion_url: Option<String>,
    /// Local GGML Whisper model, used instead of `asr_url` when set
    pub whisper_model: Option<PathBuf>,
    pub request_timeout_secs: u64,
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub url: Option<String>,
    /// Load the translator at startup instead of on first use
    pub eager: bool,
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LimitsConfig {
    /// Deadline per blocking model call, e.g. "120s" or "2m"
    pub inference_timeout: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            max_upload_mb: defaults::MAX_UPLOAD_MB,
        }
    }
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            prefer_unified: true,
            use_gpu: false,
            unified_url: None,
            asr_url: None,
            emotion_url: None,
            whisper_model: None,
            request_timeout_secs: defaults::SIDECAR_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: None,
            eager: false,
        }
    }
}

impl LimitsConfig {
    /// Parsed inference deadline, `None` when unset.
    pub fn inference_timeout(&self) -> Result<Option<Duration>> {
        self.inference_timeout
            .as_deref()
            .map(|raw| {
                humantime::parse_duration(raw).map_err(|e| VoxError::ConfigInvalidValue {
                    key: "limits.inference_timeout".to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()
    }
}

impl BackendsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e)
                if e.downcast_ref::<std::io::Error>()
                    .is_some_and(|io_err| io_err.kind() == std::io::ErrorKind::NotFound) =>
            {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.context(format!("Failed to load config from {}", path.display()))),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - USE_SENSEVOICE → backends.prefer_unified
    /// - USE_GPU → backends.use_gpu
    /// - ENABLE_TRANSLATION → translation.enabled
    /// - VOXSENSE_HOST / VOXSENSE_PORT → server.host / server.port
    /// - VOXSENSE_UNIFIED_URL, VOXSENSE_ASR_URL, VOXSENSE_EMOTION_URL → backends.*_url
    /// - VOXSENSE_TRANSLATOR_URL → translation.url
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(flag) = env_flag("USE_SENSEVOICE") {
            self.backends.prefer_unified = flag;
        }

        if let Some(flag) = env_flag("USE_GPU") {
            self.backends.use_gpu = flag;
        }

        if let Some(flag) = env_flag("ENABLE_TRANSLATION") {
            self.translation.enabled = flag;
        }

        if let Some(host) = env_string("VOXSENSE_HOST") {
            self.server.host = host;
        }

        if let Some(port) = env_string("VOXSENSE_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid VOXSENSE_PORT"),
            }
        }

        if let Some(url) = env_string("VOXSENSE_UNIFIED_URL") {
            self.backends.unified_url = Some(url);
        }

        if let Some(url) = env_string("VOXSENSE_ASR_URL") {
            self.backends.asr_url = Some(url);
        }

        if let Some(url) = env_string("VOXSENSE_EMOTION_URL") {
            self.backends.emotion_url = Some(url);
        }

        if let Some(url) = env_string("VOXSENSE_TRANSLATOR_URL") {
            self.translation.url = Some(url);
        }

        self
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        if self.server.max_upload_mb == 0 {
            return Err(VoxError::ConfigInvalidValue {
                key: "server.max_upload_mb".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.backends.request_timeout_secs == 0 {
            return Err(VoxError::ConfigInvalidValue {
                key: "backends.request_timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        self.limits.inference_timeout()?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/voxsense/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("voxsense")
            .join("config.toml")
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_flag(key: &str) -> Option<bool> {
    let value = env_string(key)?;
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!(key, value = %value, "Ignoring unrecognized boolean");
            None
        }
    }
}
