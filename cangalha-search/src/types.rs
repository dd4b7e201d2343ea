//! Core types for web snippets and source identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A short text excerpt returned by one of the lookup sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSnippet {
    /// Which source produced this snippet.
    pub source: SourceKind,
    /// The snippet body: an instant-answer abstract, or a news headline.
    pub text: String,
    /// Short description accompanying a news headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Link to the originating page, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Publication date as reported by the source (not normalised).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl WebSnippet {
    /// Build a snippet carrying only text.
    pub fn text(source: SourceKind, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
            description: None,
            url: None,
            published_at: None,
        }
    }
}

/// The independent lookup sources the aggregator can query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// DuckDuckGo Instant Answer JSON API.
    InstantAnswer,
    /// Google News RSS search feed.
    NewsFeed,
}

impl SourceKind {
    /// Returns the human-readable label of this source.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InstantAnswer => "DuckDuckGo",
            Self::NewsFeed => "Google News",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optional subject hint steering which lookup strategy runs first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainHint {
    /// No specialised lookup; instant answer first, then news digest.
    #[default]
    General,
    /// Scores, matches and championships.
    Sports,
    /// Forecasts and current conditions.
    Weather,
}

impl DomainHint {
    /// Prefix prepended to the query for the specialised lookup.
    ///
    /// Returns `None` for [`DomainHint::General`], which has no specialised
    /// strategy.
    pub fn query_prefix(&self) -> Option<&'static str> {
        match self {
            Self::General => None,
            Self::Sports => Some("esportes"),
            Self::Weather => Some("previsão do tempo"),
        }
    }
}

impl fmt::Display for DomainHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::General => "general",
            Self::Sports => "sports",
            Self::Weather => "weather",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_text_constructor_leaves_metadata_empty() {
        let s = WebSnippet::text(SourceKind::InstantAnswer, "Lisboa é a capital de Portugal.");
        assert_eq!(s.source, SourceKind::InstantAnswer);
        assert!(s.url.is_none());
        assert!(s.description.is_none());
        assert!(s.published_at.is_none());
    }

    #[test]
    fn source_kind_display() {
        assert_eq!(SourceKind::InstantAnswer.to_string(), "DuckDuckGo");
        assert_eq!(SourceKind::NewsFeed.to_string(), "Google News");
    }

    #[test]
    fn snippet_serialization_skips_missing_fields() {
        let s = WebSnippet::text(SourceKind::NewsFeed, "Manchete");
        let json = serde_json::to_string(&s).expect("serialize");
        assert!(!json.contains("url"));
        assert!(json.contains("news_feed"));
    }

    #[test]
    fn domain_hint_prefixes() {
        assert_eq!(DomainHint::General.query_prefix(), None);
        assert_eq!(DomainHint::Sports.query_prefix(), Some("esportes"));
        assert_eq!(DomainHint::Weather.query_prefix(), Some("previsão do tempo"));
    }

    #[test]
    fn domain_hint_default_is_general() {
        assert_eq!(DomainHint::default(), DomainHint::General);
    }

    #[test]
    fn domain_hint_deserializes_lowercase() {
        let hint: DomainHint = serde_json::from_str("\"weather\"").expect("deserialize");
        assert_eq!(hint, DomainHint::Weather);
    }
}
