//! Default configuration constants for voxsense.
//!
//! Shared constants used by the config layer, the analysis core and the HTTP
//! boundary so the same values are not spelled out in several places.

/// Language value that asks the backend to detect the spoken language.
pub const AUTO_LANGUAGE: &str = "auto";

/// Default language hint for `/analyze`.
pub const DEFAULT_LANGUAGE: &str = AUTO_LANGUAGE;

/// Language reported when the unified backend echoes back `auto`.
pub const FALLBACK_DETECTED_LANGUAGE: &str = "en";

/// Language reported when the unified backend produced no output at all.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Confidence assigned to the resolved emotion on the unified path.
///
/// The unified backend does not expose a probability distribution, so this is
/// a fixed placeholder rather than a measured value.
pub const UNIFIED_CONFIDENCE: f32 = 0.85;

/// Probability assigned to every non-resolved emotion on the unified path.
pub const UNIFIED_RESIDUAL: f32 = 0.05;

/// Flag shown for translation targets the language registry does not know.
pub const FALLBACK_FLAG: &str = "🏳️";

/// Internal translation code used when the source language is unknown.
pub const FALLBACK_TRANSLATION_CODE: &str = "eng_Latn";

/// Default bind address for the HTTP server.
pub const HOST: &str = "0.0.0.0";

/// Default port for the HTTP server.
pub const PORT: u16 = 8000;

/// Default upload size limit in megabytes.
pub const MAX_UPLOAD_MB: usize = 25;

/// Default per-request timeout for model sidecar HTTP calls, in seconds.
pub const SIDECAR_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Default log filter when neither `RUST_LOG` nor `-v` is given.
pub const LOG_FILTER: &str = "voxsense=info,tower_http=info";
