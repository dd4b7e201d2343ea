//! # cangalha-search
//!
//! Best-effort web snippet lookups for Cangalha.
//!
//! Live questions (scores, forecasts, "today" news) are enriched with short
//! excerpts from public sources that need no API keys: the DuckDuckGo
//! Instant Answer API and the Google News RSS search feed.
//!
//! ## Design
//!
//! - Both sources are queried concurrently and settled independently
//! - Every request walks an ordered list of access routes (direct, then
//!   public pass-through proxies) until one returns something usable
//! - Responses are parsed defensively; malformed or empty bodies degrade to
//!   "no result", never to an error at the crate boundary
//! - Search queries are logged only at trace level

pub mod aggregate;
pub mod config;
pub mod error;
pub mod http;
pub mod route;
pub mod source;
pub mod sources;
pub mod types;

pub use aggregate::Aggregator;
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use route::Route;
pub use source::SnippetSource;
pub use types::{DomainHint, SourceKind, WebSnippet};

/// Aggregate live snippets for `query` using the public sources.
///
/// Returns `None` when nothing usable was found or the configuration is
/// invalid; individual source failures are logged, never returned.
///
/// # Examples
///
/// ```no_run
/// # async fn example() {
/// let config = cangalha_search::SearchConfig::default();
/// let hint = cangalha_search::DomainHint::Weather;
/// if let Some(text) = cangalha_search::aggregate("são paulo hoje", hint, &config).await {
///     println!("{text}");
/// }
/// # }
/// ```
pub async fn aggregate(query: &str, hint: DomainHint, config: &SearchConfig) -> Option<String> {
    if let Err(err) = config.validate() {
        tracing::warn!(error = %err, "invalid search configuration");
        return None;
    }
    Aggregator::new(config.clone()).aggregate(query, hint).await
}

/// General web lookup (instant answer, then news digest).
///
/// Same degradation rules as [`aggregate`].
pub async fn search_web(query: &str, config: &SearchConfig) -> Option<String> {
    if let Err(err) = config.validate() {
        tracing::warn!(error = %err, "invalid search configuration");
        return None;
    }
    Aggregator::new(config.clone()).search_web(query).await
}
