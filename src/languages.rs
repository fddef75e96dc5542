//! Storywrangler languages that we know about

use std::sync::OnceLock;
use unicase::UniCase;

/// Get information about a language from its code
///
/// Lookup is case-insensitive. The Storywrangler service tracks many more
/// languages than listed here, so a failed lookup is not an error.
pub fn get(code: &str) -> Option<LanguageInfo> {
    let code = UniCase::new(code);
    supported_languages()
        .iter()
        .find(|lang| UniCase::new(lang.code) == code)
        .copied()
}

/// What we know about a language tracked by Storywrangler
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LanguageInfo {
    /// Human-readable name
    pub name: &'static str,

    /// Language code, as used in API queries
    pub code: &'static str,
}

/// Languages that are known to be tracked by the service
fn supported_languages() -> &'static [LanguageInfo] {
    static LAZY: OnceLock<Box<[LanguageInfo]>> = OnceLock::new();
    LAZY.get_or_init(|| {
        [
            ("English", "en"),
            ("Spanish", "es"),
            ("Portuguese", "pt"),
            ("Arabic", "ar"),
            ("Korean", "ko"),
            ("French", "fr"),
            ("Indonesian", "id"),
            ("Turkish", "tr"),
            ("German", "de"),
            ("Italian", "it"),
            ("Russian", "ru"),
            ("Tagalog", "tl"),
            ("Hindi", "hi"),
            ("Persian", "fa"),
            ("Urdu", "ur"),
            ("Polish", "pl"),
            ("Catalan", "ca"),
            ("Dutch", "nl"),
            ("Tamil", "ta"),
            ("Greek", "el"),
            ("Swedish", "sv"),
            ("Serbian", "sr"),
            ("Finnish", "fi"),
            ("Ukrainian", "uk"),
        ]
        .into_iter()
        .map(|(name, code)| LanguageInfo { name, code })
        .collect()
    })
}
