//! Supported-language catalog.
//!
//! One static table covers the API catalog endpoint, transcreation prompt
//! wording, and synthesis voice selection.

/// A language the system accepts as input or produces dubbed audio for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// BCP-47 tag, e.g. "hi-IN".
    pub tag: &'static str,
    /// English display name.
    pub name: &'static str,
    /// Short code the speech-synthesis collaborator expects.
    pub synthesis_code: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { tag: "hi-IN", name: "Hindi", synthesis_code: "hi" },
    LanguageInfo { tag: "en-IN", name: "English (India)", synthesis_code: "en" },
    LanguageInfo { tag: "ta-IN", name: "Tamil", synthesis_code: "ta" },
    LanguageInfo { tag: "te-IN", name: "Telugu", synthesis_code: "te" },
    LanguageInfo { tag: "bn-IN", name: "Bengali", synthesis_code: "bn" },
    LanguageInfo { tag: "mr-IN", name: "Marathi", synthesis_code: "mr" },
    LanguageInfo { tag: "kn-IN", name: "Kannada", synthesis_code: "kn" },
    LanguageInfo { tag: "ml-IN", name: "Malayalam", synthesis_code: "ml" },
    LanguageInfo { tag: "gu-IN", name: "Gujarati", synthesis_code: "gu" },
];

pub fn find(tag: &str) -> Option<&'static LanguageInfo> {
    SUPPORTED_LANGUAGES.iter().find(|l| l.tag == tag)
}

pub fn is_supported(tag: &str) -> bool {
    find(tag).is_some()
}

/// Display name for a tag, falling back to the tag itself.
pub fn display_name(tag: &str) -> &str {
    match find(tag) {
        Some(info) => info.name,
        None => tag,
    }
}

/// Synthesis voice code for a tag, falling back to English.
pub fn synthesis_code(tag: &str) -> &'static str {
    match find(tag) {
        Some(info) => info.synthesis_code,
        None => "en",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_resolves() {
        for lang in SUPPORTED_LANGUAGES {
            assert_eq!(display_name(lang.tag), lang.name);
            assert_eq!(synthesis_code(lang.tag), lang.synthesis_code);
            assert!(is_supported(lang.tag));
        }
    }

    #[test]
    fn test_unknown_tag_fallbacks() {
        assert_eq!(display_name("fr-FR"), "fr-FR");
        assert_eq!(synthesis_code("fr-FR"), "en");
        assert!(!is_supported("fr-FR"));
    }
}
