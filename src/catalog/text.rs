//! Text fields that are either a plain string or a per-language mapping.
//!
//! The language key set is open: catalogs carry `en`, `zh-CN`, `zh-TW`, `ja`,
//! `de` and friends, and nothing here assumes a fixed list. All display
//! fallback goes through [`LocalizedText::resolve`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Language used when the preferred one is missing.
pub const FALLBACK_LANGUAGE: &str = "en";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocalizedText {
    Plain(String),
    Localized(BTreeMap<String, String>),
}

impl LocalizedText {
    /// Pick the text for `preferred`, falling back to `en`, then to the
    /// lowest language key, then to the empty string.
    pub fn resolve(&self, preferred: &str) -> &str {
        match self {
            LocalizedText::Plain(text) => text,
            LocalizedText::Localized(map) => map
                .get(preferred)
                .or_else(|| map.get(FALLBACK_LANGUAGE))
                .or_else(|| map.values().next())
                .map(String::as_str)
                .unwrap_or(""),
        }
    }

    /// Every language rendition of this text.
    pub fn variants(&self) -> impl Iterator<Item = &str> {
        let (plain, localized) = match self {
            LocalizedText::Plain(text) => (Some(text.as_str()), None),
            LocalizedText::Localized(map) => (None, Some(map)),
        };
        plain
            .into_iter()
            .chain(localized.into_iter().flat_map(|map| map.values().map(String::as_str)))
    }

    /// Plain strings always count as English.
    pub fn has_fallback(&self) -> bool {
        match self {
            LocalizedText::Plain(_) => true,
            LocalizedText::Localized(map) => map.contains_key(FALLBACK_LANGUAGE),
        }
    }

    pub fn languages(&self) -> Vec<&str> {
        match self {
            LocalizedText::Plain(_) => vec![FALLBACK_LANGUAGE],
            LocalizedText::Localized(map) => map.keys().map(String::as_str).collect(),
        }
    }

    /// True when any rendition matches `keyword`.
    pub fn matches_keyword(&self, keyword: &Keyword) -> bool {
        self.variants().any(|text| keyword.matches(text))
    }
}

impl Default for LocalizedText {
    fn default() -> Self {
        LocalizedText::Plain(String::new())
    }
}

impl From<&str> for LocalizedText {
    fn from(value: &str) -> Self {
        LocalizedText::Plain(value.to_string())
    }
}

// Characters ignored when comparing words, so "Wi-Fi" and "wifi" compare equal.
const WORD_SEPARATORS: &[char] = &['-', '_'];

/// Lowercase `text` and drop whitespace and word separators. Every other
/// character, punctuation included, is kept.
pub fn fold_for_match(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !WORD_SEPARATORS.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A search keyword prepared for case-insensitive substring matching.
///
/// Text matches when it contains the lowercased keyword as typed, or when the
/// folded text contains the folded keyword (see [`fold_for_match`]).
pub struct Keyword {
    raw: String,
    folded: String,
}

impl Keyword {
    /// Returns `None` for a blank keyword.
    pub fn parse(keyword: &str) -> Option<Self> {
        let raw = keyword.trim().to_lowercase();
        if raw.is_empty() {
            return None;
        }
        let folded = fold_for_match(&raw);
        Some(Self { raw, folded })
    }

    pub fn matches(&self, text: &str) -> bool {
        if text.to_lowercase().contains(&self.raw) {
            return true;
        }
        // A keyword made only of separators must match them literally.
        !self.folded.is_empty() && fold_for_match(text).contains(&self.folded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn localized(entries: &[(&str, &str)]) -> LocalizedText {
        LocalizedText::Localized(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn resolve_prefers_requested_language_then_english() {
        let text = localized(&[("en", "Audio"), ("de", "Ton"), ("ja", "オーディオ")]);
        assert_eq!(text.resolve("de"), "Ton");
        assert_eq!(text.resolve("fr"), "Audio");
        assert_eq!(LocalizedText::from("plain").resolve("ja"), "plain");
    }

    #[test]
    fn resolve_falls_back_to_any_entry_then_empty() {
        let text = localized(&[("zh-TW", "音效"), ("ko", "오디오")]);
        assert_eq!(text.resolve("fr"), "오디오");
        assert_eq!(localized(&[]).resolve("en"), "");
    }

    #[test]
    fn keyword_match_spans_languages_and_separators() {
        let text = localized(&[("en", "Adds Wi-Fi support"), ("de", "WLAN-Unterstützung")]);
        let keyword = |k: &str| Keyword::parse(k).unwrap();
        assert!(text.matches_keyword(&keyword("wifi")));
        assert!(text.matches_keyword(&keyword("WI FI")));
        assert!(text.matches_keyword(&keyword("wlan")));
        assert!(text.matches_keyword(&keyword("-")));
        assert!(!text.matches_keyword(&keyword("bluetooth")));
        assert!(!text.matches_keyword(&keyword("wi.fi")));
    }

    #[test]
    fn keyword_keeps_punctuation_other_than_separators() {
        assert_eq!(fold_for_match("Wi-Fi Support_x"), "wifisupportx");
        assert_eq!(fold_for_match("C++"), "c++");
        assert!(Keyword::parse("   ").is_none());
        let plus = Keyword::parse("C++").unwrap();
        assert!(plus.matches("Written in c++"));
        assert!(!plus.matches("Written in C"));
        let dash = Keyword::parse("-").unwrap();
        assert!(!dash.matches("plain text"));
        assert!(dash.matches("layout-id"));
    }

    #[test]
    fn untagged_deserialization_accepts_both_shapes() {
        let plain: LocalizedText = serde_json::from_str("\"Lilu\"").unwrap();
        assert_eq!(plain, LocalizedText::from("Lilu"));
        let map: LocalizedText = serde_json::from_str(r#"{"en":"Lilu","zh-CN":"Lilu"}"#).unwrap();
        assert!(map.has_fallback());
        assert_eq!(map.languages(), vec!["en", "zh-CN"]);
        assert_eq!(LocalizedText::from("Lilu").languages(), vec!["en"]);
    }
}
