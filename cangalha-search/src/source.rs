//! Trait definition for pluggable snippet sources.
//!
//! Each lookup source (instant answer, news feed) implements
//! [`SnippetSource`] so the aggregator can query them uniformly and tests
//! can substitute canned sources.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::types::{SourceKind, WebSnippet};

/// A best-effort external information source.
///
/// Implementors handle their own URL construction, route fallback, and
/// defensive parsing. All implementations must be `Send + Sync` so the
/// aggregator can query them concurrently.
pub trait SnippetSource: Send + Sync {
    /// Look up `query` and return the snippets found, best first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when every route failed or produced nothing
    /// usable. Callers treat this exactly like an empty result.
    fn lookup(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> impl std::future::Future<Output = Result<Vec<WebSnippet>, SearchError>> + Send;

    /// Returns which [`SourceKind`] this implementation represents.
    fn kind(&self) -> SourceKind;
}
