//! Registry of supported languages.
//!
//! Single source of truth for language metadata. Built once at startup and
//! immutable afterwards; every other component reads from it by reference.

use serde::Serialize;

/// A supported language.
///
/// `code` is the stable identity: cached translation rows reference
/// languages by code, so a code must never change once rows exist for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Language {
    /// FLORES-style language code (e.g. "spa_Latn", "rap_Latn")
    pub code: String,

    /// Display name in Spanish (the platform's UI language)
    pub name: String,

    /// Name of the language in the language itself
    pub native_name: String,

    /// Low-resource language served by the native deployment; pairs not
    /// involving the pivot are routed through it
    pub is_native: bool,
}

impl Language {
    pub fn new(code: &str, name: &str, native_name: &str, is_native: bool) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            native_name: native_name.to_string(),
            is_native,
        }
    }
}

/// Immutable collection of supported languages.
#[derive(Clone)]
pub struct LanguageRegistry {
    languages: Vec<Language>,
}

impl LanguageRegistry {
    /// Build a registry from an explicit language set.
    pub fn new(languages: Vec<Language>) -> Self {
        Self { languages }
    }

    /// Build a registry with the production language set.
    pub fn with_defaults() -> Self {
        Self::new(default_languages())
    }

    /// Look up a language by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&Language> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All registered languages.
    pub fn list_all(&self) -> &[Language] {
        &self.languages
    }

    /// Whether a code belongs to a registered language.
    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }
}

/// The language set of the production deployment: Spanish as the pivot,
/// the two supported native languages, and the regular languages the
/// general-purpose model covers.
fn default_languages() -> Vec<Language> {
    vec![
        Language::new("spa_Latn", "Español", "Español", false),
        Language::new("rap_Latn", "Rapa Nui", "Vananga Rapa Nui", true),
        Language::new("arn_Latn", "Mapuzungun", "Mapuzungun", true),
        Language::new("eng_Latn", "Inglés", "English", false),
        Language::new("fra_Latn", "Francés", "Français", false),
        Language::new("por_Latn", "Portugués", "Português", false),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_code_spanish() {
        let registry = LanguageRegistry::with_defaults();
        let lang = registry.get_by_code("spa_Latn").expect("should exist");

        assert_eq!(lang.code, "spa_Latn");
        assert_eq!(lang.name, "Español");
        assert!(!lang.is_native);
    }

    #[test]
    fn test_get_by_code_rapa_nui_is_native() {
        let registry = LanguageRegistry::with_defaults();
        let lang = registry.get_by_code("rap_Latn").expect("should exist");

        assert!(lang.is_native);
        assert_eq!(lang.native_name, "Vananga Rapa Nui");
    }

    #[test]
    fn test_get_by_code_mapuzungun_is_native() {
        let registry = LanguageRegistry::with_defaults();
        let lang = registry.get_by_code("arn_Latn").expect("should exist");

        assert!(lang.is_native);
    }

    #[test]
    fn test_get_by_code_unknown() {
        let registry = LanguageRegistry::with_defaults();
        assert!(registry.get_by_code("deu_Latn").is_none());
        assert!(registry.get_by_code("").is_none());
    }

    #[test]
    fn test_is_supported() {
        let registry = LanguageRegistry::with_defaults();
        assert!(registry.is_supported("eng_Latn"));
        assert!(!registry.is_supported("xx"));
    }

    #[test]
    fn test_list_all_contains_defaults() {
        let registry = LanguageRegistry::with_defaults();
        let all = registry.list_all();

        assert_eq!(all.len(), 6);
        assert!(all.iter().any(|l| l.code == "spa_Latn"));
        assert!(all.iter().any(|l| l.code == "rap_Latn"));
        assert!(all.iter().any(|l| l.code == "arn_Latn"));
    }

    #[test]
    fn test_regular_languages_are_not_native() {
        let registry = LanguageRegistry::with_defaults();
        for code in ["spa_Latn", "eng_Latn", "fra_Latn", "por_Latn"] {
            let lang = registry.get_by_code(code).expect("should exist");
            assert!(!lang.is_native, "{} should not be native", code);
        }
    }

    #[test]
    fn test_custom_registry() {
        let registry = LanguageRegistry::new(vec![
            Language::new("spa_Latn", "Español", "Español", false),
            Language::new("rap_Latn", "Rapa Nui", "Vananga Rapa Nui", true),
        ]);

        assert_eq!(registry.list_all().len(), 2);
        assert!(registry.is_supported("rap_Latn"));
        assert!(!registry.is_supported("eng_Latn"));
    }

    #[test]
    fn test_language_equality() {
        let a = Language::new("spa_Latn", "Español", "Español", false);
        let b = Language::new("spa_Latn", "Español", "Español", false);
        let c = Language::new("rap_Latn", "Rapa Nui", "Vananga Rapa Nui", true);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_language_serializes_with_code() {
        let lang = Language::new("rap_Latn", "Rapa Nui", "Vananga Rapa Nui", true);
        let json = serde_json::to_string(&lang).expect("serialize");

        assert!(json.contains("rap_Latn"));
        assert!(json.contains("is_native"));
    }
}
