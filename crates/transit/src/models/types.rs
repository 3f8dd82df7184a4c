//! Core data types and errors for transit data.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Localized names
// ============================================================================

/// Language used when the preferred one has no entry.
pub const FALLBACK_LANGUAGE: &str = "en";

/// A display name keyed by language code (`"en"`, `"zh"`, ...).
///
/// Entries keep the order they had in the dataset, which matters for the last
/// step of [`LanguageChain`] resolution ("first available").
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct LocalizedName {
    entries: Vec<(Arc<str>, Arc<str>)>,
}

impl LocalizedName {
    pub fn new<L, T>(entries: impl IntoIterator<Item = (L, T)>) -> Self
    where
        L: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(lang, text)| (lang.as_ref().into(), text.as_ref().into()))
                .collect(),
        }
    }

    /// Exact lookup for one language; empty strings count as missing.
    pub fn get(&self, language: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(lang, text)| &**lang == language && !text.is_empty())
            .map(|(_, text)| &**text)
    }

    /// Every non-empty variant, in dataset order.
    pub fn variants(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries
            .iter()
            .map(|(_, text)| &**text)
            .filter(|text| !text.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.variants().next().is_none()
    }

    pub fn resolve(&self, chain: &LanguageChain) -> Option<&str> {
        chain.resolve(self)
    }
}

impl From<Map<String, Value>> for LocalizedName {
    fn from(map: Map<String, Value>) -> Self {
        // Non-string values are dropped rather than failing the whole record.
        Self {
            entries: map
                .into_iter()
                .filter_map(|(lang, value)| match value {
                    Value::String(text) => Some((lang.into(), text.into())),
                    _ => None,
                })
                .collect(),
        }
    }
}

impl From<LocalizedName> for Map<String, Value> {
    fn from(name: LocalizedName) -> Self {
        name.entries
            .into_iter()
            .map(|(lang, text)| (lang.to_string(), Value::String(text.to_string())))
            .collect()
    }
}

/// Ordered fallback used to pick one display string out of a [`LocalizedName`]:
/// the preferred language, then [`FALLBACK_LANGUAGE`], then the first
/// non-empty entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageChain {
    preferred: Arc<str>,
}

impl LanguageChain {
    pub fn new(preferred: impl AsRef<str>) -> Self {
        Self {
            preferred: preferred.as_ref().into(),
        }
    }

    pub fn preferred(&self) -> &str {
        &self.preferred
    }

    pub fn resolve<'a>(&self, name: &'a LocalizedName) -> Option<&'a str> {
        name.get(&self.preferred)
            .or_else(|| name.get(FALLBACK_LANGUAGE))
            .or_else(|| name.variants().next())
    }
}

impl Default for LanguageChain {
    fn default() -> Self {
        Self::new(FALLBACK_LANGUAGE)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Dataset parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    Cache(#[from] rusqlite::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn name() -> LocalizedName {
        serde_json::from_str(r#"{"zh": "尖沙咀碼頭", "en": "Star Ferry", "ja": ""}"#).unwrap()
    }

    #[test]
    fn test_language_chain_prefers_requested_language() {
        assert_eq!(name().resolve(&LanguageChain::new("zh")), Some("尖沙咀碼頭"));
    }

    #[test]
    fn test_language_chain_falls_back_to_english() {
        assert_eq!(name().resolve(&LanguageChain::new("fr")), Some("Star Ferry"));
        // Empty entries are treated as missing.
        assert_eq!(name().resolve(&LanguageChain::new("ja")), Some("Star Ferry"));
    }

    #[test]
    fn test_language_chain_uses_first_available() {
        let name = LocalizedName::new([("zh", "中環"), ("ja", "中環駅")]);
        assert_eq!(name.resolve(&LanguageChain::new("fr")), Some("中環"));
        assert_eq!(LocalizedName::default().resolve(&LanguageChain::default()), None);
    }

    #[test]
    fn test_localized_name_skips_non_string_values() {
        let name: LocalizedName = serde_json::from_str(r#"{"en": "Central", "zh": null}"#).unwrap();
        assert_eq!(name.variants().collect::<Vec<_>>(), vec!["Central"]);
        assert!(!name.is_empty());
    }

    #[test]
    fn test_localized_name_keeps_dataset_order() {
        let json = serde_json::to_string(&name()).unwrap();
        assert_eq!(json, r#"{"zh":"尖沙咀碼頭","en":"Star Ferry","ja":""}"#);
    }
}
