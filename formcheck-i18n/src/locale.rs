//! Locale tags and their fallback chain.

use crate::{I18nError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A locale: language plus optional script and region.
///
/// # Examples
///
/// ```
/// use formcheck_i18n::Locale;
///
/// let fr_ca: Locale = "fr-CA".parse().unwrap();
/// assert_eq!(fr_ca.tag(), "fr-CA");
/// assert_eq!(fr_ca.language_only().tag(), "fr");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    /// Language code (ISO 639-1, e.g., "en", "fr", "de")
    pub language: String,
    /// Optional region code (ISO 3166-1, e.g., "US", "FR")
    pub region: Option<String>,
    /// Optional script (e.g., "Latn", "Hans")
    pub script: Option<String>,
}

impl Locale {
    /// Create a new locale.
    pub fn new(language: impl Into<String>, region: Option<impl Into<String>>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            region: region.map(|r| r.into().to_uppercase()),
            script: None,
        }
    }

    /// Parse a BCP 47 tag such as `en-US` or `zh-Hans-CN`. Underscores are
    /// accepted as separators.
    pub fn parse(tag: &str) -> Result<Self> {
        let mut parts = tag.split(['-', '_']);
        let language = parts.next().unwrap_or_default().to_lowercase();

        if language.len() < 2
            || language.len() > 3
            || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(I18nError::InvalidLocale(tag.to_string()));
        }

        let mut script = None;
        let mut region = None;

        for part in parts {
            if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut chars = part.chars();
                script = chars.next().map(|first| {
                    first
                        .to_uppercase()
                        .chain(chars.flat_map(|c| c.to_lowercase()))
                        .collect()
                });
            } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                region = Some(part.to_uppercase());
            } else if part.len() == 3 && part.chars().all(|c| c.is_ascii_digit()) {
                // UN M.49 area code
                region = Some(part.to_string());
            } else {
                return Err(I18nError::InvalidLocale(tag.to_string()));
            }
        }

        Ok(Self {
            language,
            script,
            region,
        })
    }

    /// Canonical tag (e.g., "en-US").
    pub fn tag(&self) -> String {
        let mut tag = self.language.clone();
        if let Some(ref script) = self.script {
            tag.push('-');
            tag.push_str(script);
        }
        if let Some(ref region) = self.region {
            tag.push('-');
            tag.push_str(region);
        }
        tag
    }

    /// Same locale without its region.
    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            script: self.script.clone(),
            region: None,
        }
    }

    /// Tags to try, most specific first: `zh-Hans-CN`, `zh-Hans`, `zh`.
    pub fn fallback_tags(&self) -> Vec<String> {
        let mut tags = vec![self.tag()];
        if self.region.is_some() {
            tags.push(self.language_only().tag());
        }
        if self.script.is_some() {
            tags.push(self.language.clone());
        }
        tags.dedup();
        tags
    }

    pub fn en() -> Self {
        Self::new("en", None::<&str>)
    }

    pub fn en_us() -> Self {
        Self::new("en", Some("US"))
    }

    pub fn fr() -> Self {
        Self::new("fr", None::<&str>)
    }

    pub fn de() -> Self {
        Self::new("de", None::<&str>)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en()
    }
}
