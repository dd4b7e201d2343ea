//! Web snippet lookups as seen by the assistant.

use async_trait::async_trait;
use cangalha_search::{Aggregator, DomainHint, SearchConfig};

use crate::error::{AssistantError, Result};

/// Best-effort live lookups. Never fails; `None` means nothing usable.
#[async_trait]
pub trait WebLookup: Send + Sync {
    /// Domain-aware aggregation for prompt enrichment.
    async fn aggregate(&self, query: &str, hint: DomainHint) -> Option<String>;

    /// General lookup for the explicit web-search command.
    async fn search_web(&self, query: &str) -> Option<String>;
}

/// [`WebLookup`] backed by the public instant-answer and news sources.
#[derive(Debug)]
pub struct SearchLookup {
    aggregator: Aggregator,
}

impl SearchLookup {
    /// Lookup over `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] if the search configuration is invalid.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AssistantError::Config(e.to_string()))?;
        Ok(Self {
            aggregator: Aggregator::new(config),
        })
    }
}

#[async_trait]
impl WebLookup for SearchLookup {
    async fn aggregate(&self, query: &str, hint: DomainHint) -> Option<String> {
        tracing::trace!(query, %hint, "aggregating web snippets");
        self.aggregator.aggregate(query, hint).await
    }

    async fn search_web(&self, query: &str) -> Option<String> {
        tracing::trace!(query, "web search");
        self.aggregator.search_web(query).await
    }
}
