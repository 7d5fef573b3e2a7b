//! Message catalogs.
//!
//! A [`MessageBundle`] holds the templates for one locale; [`I18n`] owns a
//! bundle per locale and resolves a key through the locale fallback chain,
//! then the fallback locale, then the default locale.

use crate::{I18nError, Locale, Result};
use formcheck_log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Templates for a single locale, keyed by message ID.
#[derive(Debug, Clone, Default)]
pub struct MessageBundle {
    messages: HashMap<String, String>,
}

impl MessageBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a JSON object. Nested objects become dotted keys, so
    /// `{"custom": {"email": {"required": "..."}}}` defines
    /// `custom.email.required`.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        let mut bundle = Self::new();
        bundle.insert_json(None, data)?;
        Ok(bundle)
    }

    fn insert_json(
        &mut self,
        prefix: Option<&str>,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        for (key, value) in data {
            let key = match prefix {
                Some(prefix) => format!("{}.{}", prefix, key),
                None => key,
            };
            match value {
                serde_json::Value::String(s) => {
                    self.messages.insert(key, s);
                }
                serde_json::Value::Object(obj) => self.insert_json(Some(&key), obj)?,
                other => {
                    return Err(I18nError::ParseError(format!(
                        "message {} must be a string, found {}",
                        key, other
                    )));
                }
            }
        }
        Ok(())
    }

    /// Add a message.
    pub fn add(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    /// Builder form of [`MessageBundle::add`].
    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.add(key, message);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(|s| s.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.messages.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.messages.keys()
    }
}

/// Bundles for several locales, keyed by locale tag.
#[derive(Debug, Default)]
pub struct Messages {
    bundles: HashMap<String, MessageBundle>,
}

impl Messages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bundle, merging into any bundle already registered for the
    /// same tag. Later messages win.
    pub fn add_bundle(&mut self, locale: &Locale, bundle: MessageBundle) {
        let entry = self.bundles.entry(locale.tag()).or_default();
        entry.messages.extend(bundle.messages);
    }

    /// Message for `key`, walking the locale's fallback tags.
    pub fn lookup(&self, key: &str, locale: &Locale) -> Option<&str> {
        self.lookup_any(&[key], locale)
    }

    /// First of `keys` defined by a bundle, trying every key in a bundle
    /// before moving to a less specific tag.
    pub fn lookup_any(&self, keys: &[&str], locale: &Locale) -> Option<&str> {
        locale
            .fallback_tags()
            .iter()
            .filter_map(|tag| self.bundles.get(tag))
            .find_map(|bundle| keys.iter().find_map(|key| bundle.get(key)))
    }

    /// Load every `<tag>.json` file in `dir`, e.g. `en.json`, `fr-CA.json`.
    pub fn load_from_dir(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();

            if path.extension().is_some_and(|ext| ext == "json") {
                let stem = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .ok_or_else(|| I18nError::ParseError(format!("invalid file name {:?}", path)))?;

                let locale = Locale::parse(stem)?;
                let bundle = MessageBundle::from_json(&fs::read_to_string(&path)?)?;
                debug!(
                    target: "formcheck::i18n",
                    "loaded {} messages for {}",
                    bundle.len(),
                    locale
                );
                self.add_bundle(&locale, bundle);
            }
        }

        Ok(())
    }
}

/// Thread-safe catalog with locale fallback.
///
/// Clones share the same underlying bundles.
pub struct I18n {
    messages: Arc<RwLock<Messages>>,
    default_locale: Locale,
    fallback_locale: Option<Locale>,
}

impl I18n {
    /// Empty catalog with `en` as the default locale.
    pub fn new() -> Self {
        Self {
            messages: Arc::new(RwLock::new(Messages::new())),
            default_locale: Locale::en(),
            fallback_locale: None,
        }
    }

    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    pub fn with_fallback(mut self, locale: Locale) -> Self {
        self.fallback_locale = Some(locale);
        self
    }

    pub fn load_from_dir(self, dir: impl AsRef<Path>) -> Result<Self> {
        self.messages.write().load_from_dir(dir)?;
        Ok(self)
    }

    pub fn add_bundle(&self, locale: &Locale, bundle: MessageBundle) {
        self.messages.write().add_bundle(locale, bundle);
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default_locale
    }

    /// Resolve `key` for `locale`, then the fallback locale, then the
    /// default locale. `None` when no bundle defines it.
    pub fn lookup(&self, key: &str, locale: &Locale) -> Option<String> {
        self.lookup_any(&[key], locale)
    }

    /// Resolve the first defined key among `keys`. Each locale in the chain
    /// is searched for all keys before the next locale is tried.
    pub fn lookup_any(&self, keys: &[&str], locale: &Locale) -> Option<String> {
        let messages = self.messages.read();

        std::iter::once(locale)
            .chain(self.fallback_locale.as_ref())
            .chain(std::iter::once(&self.default_locale))
            .find_map(|candidate| messages.lookup_any(keys, candidate))
            .map(str::to_string)
    }

    /// Like [`I18n::lookup`] but returns the key itself when nothing matches.
    pub fn t(&self, key: &str, locale: &Locale) -> String {
        self.lookup(key, locale).unwrap_or_else(|| key.to_string())
    }

    /// Whether the locale or one of its fallback tags defines `key`.
    pub fn has(&self, key: &str, locale: &Locale) -> bool {
        self.messages.read().lookup(key, locale).is_some()
    }
}

impl Default for I18n {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for I18n {
    fn clone(&self) -> Self {
        Self {
            messages: Arc::clone(&self.messages),
            default_locale: self.default_locale.clone(),
            fallback_locale: self.fallback_locale.clone(),
        }
    }
}

impl std::fmt::Debug for I18n {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18n")
            .field("default_locale", &self.default_locale)
            .field("fallback_locale", &self.fallback_locale)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_i18n() -> I18n {
        let i18n = I18n::new().with_default_locale(Locale::en());

        i18n.add_bundle(
            &Locale::en(),
            MessageBundle::new()
                .with("required", "This field is required.")
                .with("max", "Must be at most {0}."),
        );
        i18n.add_bundle(
            &Locale::fr(),
            MessageBundle::new().with("required", "Ce champ est obligatoire."),
        );

        i18n
    }

    #[test]
    fn test_lookup_exact_locale() {
        let i18n = create_test_i18n();
        assert_eq!(
            i18n.lookup("required", &Locale::fr()).as_deref(),
            Some("Ce champ est obligatoire.")
        );
    }

    #[test]
    fn test_region_falls_back_to_language() {
        let i18n = create_test_i18n();
        let fr_ca = Locale::parse("fr-CA").unwrap();
        assert_eq!(i18n.t("required", &fr_ca), "Ce champ est obligatoire.");
    }

    #[test]
    fn test_missing_translation_uses_default_locale() {
        let i18n = create_test_i18n();
        assert_eq!(i18n.t("max", &Locale::fr()), "Must be at most {0}.");
        assert_eq!(i18n.t("required", &Locale::de()), "This field is required.");
    }

    #[test]
    fn test_unknown_key() {
        let i18n = create_test_i18n();
        assert_eq!(i18n.lookup("nope", &Locale::en()), None);
        assert_eq!(i18n.t("nope", &Locale::en()), "nope");
    }

    #[test]
    fn test_fallback_locale_precedes_default() {
        let i18n = create_test_i18n().with_fallback(Locale::fr());
        let de = Locale::de();
        assert_eq!(i18n.t("required", &de), "Ce champ est obligatoire.");
    }

    #[test]
    fn test_lookup_any_prefers_earlier_key_per_locale() {
        let i18n = create_test_i18n();
        i18n.add_bundle(
            &Locale::en(),
            MessageBundle::new().with("custom.email.required", "We need your email."),
        );

        // the French generic message beats the English override
        assert_eq!(
            i18n.lookup_any(&["custom.email.required", "required"], &Locale::fr())
                .as_deref(),
            Some("Ce champ est obligatoire.")
        );
        assert_eq!(
            i18n.lookup_any(&["custom.email.required", "required"], &Locale::en())
                .as_deref(),
            Some("We need your email.")
        );
    }

    #[test]
    fn test_bundle_from_json_nested() {
        let json = r#"{
            "required": "Required.",
            "custom": { "email": { "required": "We need your email." } }
        }"#;

        let bundle = MessageBundle::from_json(json).unwrap();
        assert_eq!(bundle.get("required"), Some("Required."));
        assert_eq!(bundle.get("custom.email.required"), Some("We need your email."));
        assert_eq!(bundle.len(), 2);
    }

    #[test]
    fn test_bundle_from_json_rejects_numbers() {
        assert!(MessageBundle::from_json(r#"{"max": 3}"#).is_err());
    }

    #[test]
    fn test_add_bundle_merges() {
        let i18n = create_test_i18n();
        i18n.add_bundle(&Locale::fr(), MessageBundle::new().with("max", "Au plus {0}."));

        assert_eq!(i18n.t("max", &Locale::fr()), "Au plus {0}.");
        assert_eq!(i18n.t("required", &Locale::fr()), "Ce champ est obligatoire.");
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("de.json"), r#"{"required": "Pflichtfeld."}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let i18n = I18n::new().load_from_dir(dir.path()).unwrap();
        assert_eq!(i18n.t("required", &Locale::de()), "Pflichtfeld.");
        assert!(i18n.has("required", &Locale::parse("de-AT").unwrap()));
    }
}
