//! Lookup configuration with sensible defaults.
//!
//! [`SearchConfig`] controls source endpoints, access routes, timeouts, and
//! the merge thresholds used by the aggregator.

use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::route::Route;

/// Default DuckDuckGo Instant Answer endpoint.
pub const DEFAULT_INSTANT_ANSWER_URL: &str = "https://api.duckduckgo.com";

/// Default Google News RSS endpoint.
pub const DEFAULT_NEWS_FEED_URL: &str = "https://news.google.com";

/// Configuration for snippet lookups.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Access routes, tried in order for every source request.
    pub routes: Vec<Route>,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Maximum number of feed items folded into a news digest.
    pub max_news_items: usize,
    /// Description characters kept per digest entry.
    pub description_chars: usize,
    /// Instant-answer abstracts at or below this length are treated as noise.
    pub min_abstract_chars: usize,
    /// Weather lookups shorter than this fall back to the general search.
    pub min_weather_chars: usize,
    /// Sports lookups shorter than this fall back to the general search.
    pub min_sports_chars: usize,
    /// Base URL of the instant-answer API.
    pub instant_answer_url: String,
    /// Base URL of the news feed search.
    pub news_feed_url: String,
    /// Custom User-Agent string. If `None`, rotates through a built-in list
    /// of realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            routes: Route::all().to_vec(),
            timeout_seconds: 8,
            max_news_items: 5,
            description_chars: 200,
            min_abstract_chars: 20,
            min_weather_chars: 50,
            min_sports_chars: 20,
            instant_answer_url: DEFAULT_INSTANT_ANSWER_URL.to_owned(),
            news_feed_url: DEFAULT_NEWS_FEED_URL.to_owned(),
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `routes` must not be empty
    /// - `timeout_seconds` must be greater than 0
    /// - `max_news_items` must be greater than 0
    /// - both endpoint URLs must be non-empty
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.routes.is_empty() {
            return Err(SearchError::Config(
                "at least one route must be enabled".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.max_news_items == 0 {
            return Err(SearchError::Config(
                "max_news_items must be greater than 0".into(),
            ));
        }
        if self.instant_answer_url.trim().is_empty() || self.news_feed_url.trim().is_empty() {
            return Err(SearchError::Config("source URLs must not be empty".into()));
        }
        Ok(())
    }
}
