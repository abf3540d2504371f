//! Language metadata for transcription and translation.
//!
//! The translation table maps the short codes used on the HTTP surface to the
//! FLORES-200 codes the translation model expects, along with a display name
//! and a flag for the UI.

use crate::defaults;
use serde::Serialize;

/// Metadata for a translation target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageInfo {
    /// Short code used by clients (e.g. "es", "zh-TW")
    pub code: &'static str,
    /// Human-readable name
    #[serde(rename = "name")]
    pub display_name: &'static str,
    /// Flag glyph for the UI
    #[serde(rename = "flag")]
    pub flag_glyph: &'static str,
    /// FLORES-200 code passed to the translation model
    #[serde(rename = "translation_code")]
    pub internal_translation_code: &'static str,
}

const fn lang(
    code: &'static str,
    display_name: &'static str,
    flag_glyph: &'static str,
    internal_translation_code: &'static str,
) -> LanguageInfo {
    LanguageInfo {
        code,
        display_name,
        flag_glyph,
        internal_translation_code,
    }
}

/// Languages the translation model supports.
pub const LANGUAGES: &[LanguageInfo] = &[
    lang("en", "English", "🇬🇧", "eng_Latn"),
    lang("es", "Spanish", "🇪🇸", "spa_Latn"),
    lang("fr", "French", "🇫🇷", "fra_Latn"),
    lang("de", "German", "🇩🇪", "deu_Latn"),
    lang("it", "Italian", "🇮🇹", "ita_Latn"),
    lang("pt", "Portuguese", "🇵🇹", "por_Latn"),
    lang("ru", "Russian", "🇷🇺", "rus_Cyrl"),
    lang("zh", "Chinese (Simplified)", "🇨🇳", "zho_Hans"),
    lang("zh-TW", "Chinese (Traditional)", "🇹🇼", "zho_Hant"),
    lang("ja", "Japanese", "🇯🇵", "jpn_Jpan"),
    lang("ko", "Korean", "🇰🇷", "kor_Hang"),
    lang("ar", "Arabic", "🇸🇦", "arb_Arab"),
    lang("hi", "Hindi", "🇮🇳", "hin_Deva"),
    lang("bn", "Bengali", "🇧🇩", "ben_Beng"),
    lang("vi", "Vietnamese", "🇻🇳", "vie_Latn"),
    lang("th", "Thai", "🇹🇭", "tha_Thai"),
    lang("tr", "Turkish", "🇹🇷", "tur_Latn"),
    lang("pl", "Polish", "🇵🇱", "pol_Latn"),
    lang("nl", "Dutch", "🇳🇱", "nld_Latn"),
    lang("sv", "Swedish", "🇸🇪", "swe_Latn"),
    lang("da", "Danish", "🇩🇰", "dan_Latn"),
    lang("fi", "Finnish", "🇫🇮", "fin_Latn"),
    lang("no", "Norwegian", "🇳🇴", "nob_Latn"),
    lang("el", "Greek", "🇬🇷", "ell_Grek"),
    lang("he", "Hebrew", "🇮🇱", "heb_Hebr"),
    lang("id", "Indonesian", "🇮🇩", "ind_Latn"),
    lang("ms", "Malay", "🇲🇾", "zsm_Latn"),
    lang("tl", "Filipino", "🇵🇭", "tgl_Latn"),
    lang("uk", "Ukrainian", "🇺🇦", "ukr_Cyrl"),
    lang("cs", "Czech", "🇨🇿", "ces_Latn"),
    lang("ro", "Romanian", "🇷🇴", "ron_Latn"),
    lang("hu", "Hungarian", "🇭🇺", "hun_Latn"),
    lang("ta", "Tamil", "🇮🇳", "tam_Taml"),
    lang("te", "Telugu", "🇮🇳", "tel_Telu"),
    lang("mr", "Marathi", "🇮🇳", "mar_Deva"),
    lang("gu", "Gujarati", "🇮🇳", "guj_Gujr"),
    lang("kn", "Kannada", "🇮🇳", "kan_Knda"),
    lang("ml", "Malayalam", "🇮🇳", "mal_Mlym"),
    lang("pa", "Punjabi", "🇮🇳", "pan_Guru"),
    lang("ur", "Urdu", "🇵🇰", "urd_Arab"),
    lang("fa", "Persian", "🇮🇷", "pes_Arab"),
    lang("sw", "Swahili", "🇰🇪", "swh_Latn"),
];

/// Codes listed by `/languages` when no translator is configured.
pub const FALLBACK_LANGUAGE_CODES: &[&str] = &["en", "es", "fr", "de", "zh", "ja", "ko"];

/// Languages the unified backend can be told to transcribe, with display names.
pub const TRANSCRIPTION_LANGUAGES: &[(&str, &str)] = &[
    ("zh", "Chinese"),
    ("en", "English"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("yue", "Cantonese"),
    (defaults::AUTO_LANGUAGE, "Auto-detect"),
];

/// Find a translation language by code. Codes are case-sensitive ("zh-TW").
pub fn get_language(code: &str) -> Option<&'static LanguageInfo> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// All translation languages, sorted by display name.
pub fn supported_languages() -> Vec<&'static LanguageInfo> {
    let mut languages: Vec<_> = LANGUAGES.iter().collect();
    languages.sort_by_key(|l| l.display_name);
    languages
}

/// Short static list served when the translator is not configured.
pub fn fallback_languages() -> Vec<&'static LanguageInfo> {
    FALLBACK_LANGUAGE_CODES
        .iter()
        .filter_map(|code| get_language(code))
        .collect()
}

/// FLORES-200 code for a source language, defaulting to English.
pub fn source_translation_code(code: &str) -> &'static str {
    get_language(code)
        .map(|l| l.internal_translation_code)
        .unwrap_or(defaults::FALLBACK_TRANSLATION_CODE)
}

/// Display name for a transcription language, if known.
pub fn transcription_language_name(code: &str) -> Option<&'static str> {
    TRANSCRIPTION_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
