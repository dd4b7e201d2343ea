//! Snippet aggregation: concurrent source fan-out and merge rules.
//!
//! Both sources are queried concurrently and settled independently, so a
//! slow or failing source never blocks or aborts the other. The merged
//! output is a single text block ready to be folded into a prompt.
//!
//! # Merge rules
//!
//! - General queries: an instant-answer abstract longer than
//!   `min_abstract_chars` wins outright; otherwise a digest of up to
//!   `max_news_items` headlines is returned; a short abstract is the last
//!   resort; nothing at all yields `None`.
//! - Sports/weather queries: a specialised lookup (query prefixed with the
//!   domain) combines abstract and headlines under labelled sections. If that
//!   result is missing or not longer than the domain threshold, the general
//!   rules run on the bare query.

use crate::config::SearchConfig;
use crate::source::SnippetSource;
use crate::sources::{InstantAnswerSource, NewsFeedSource};
use crate::types::{DomainHint, WebSnippet};

/// Results of one concurrent fan-out, already settled.
#[derive(Debug, Default)]
struct Gathered {
    instant: Option<String>,
    news: Vec<WebSnippet>,
}

/// Queries the instant-answer and news sources and merges their output.
#[derive(Debug)]
pub struct Aggregator<A = InstantAnswerSource, N = NewsFeedSource> {
    instant: A,
    news: N,
    config: SearchConfig,
}

impl Aggregator {
    /// Create an aggregator over the public DuckDuckGo and Google News sources.
    pub fn new(config: SearchConfig) -> Self {
        Self::with_sources(InstantAnswerSource, NewsFeedSource, config)
    }
}

impl<A: SnippetSource, N: SnippetSource> Aggregator<A, N> {
    /// Create an aggregator over arbitrary sources.
    pub fn with_sources(instant: A, news: N, config: SearchConfig) -> Self {
        Self {
            instant,
            news,
            config,
        }
    }

    /// The configuration this aggregator was built with.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Aggregate snippets for `query`, steered by `hint`.
    ///
    /// Never fails: every source error degrades to "no result", and `None`
    /// means nothing usable was found anywhere.
    pub async fn aggregate(&self, query: &str, hint: DomainHint) -> Option<String> {
        let min_chars = match hint {
            DomainHint::General => return self.search_web(query).await,
            DomainHint::Weather => self.config.min_weather_chars,
            DomainHint::Sports => self.config.min_sports_chars,
        };

        match self.search_domain(hint, query).await {
            Some(text) if text.chars().count() > min_chars => Some(text),
            specialised => {
                tracing::debug!(
                    %hint,
                    found = specialised.is_some(),
                    "specialised lookup too thin, trying general lookup"
                );
                self.search_web(query).await.or(specialised)
            }
        }
    }

    /// General lookup: instant answer first, then a news digest.
    pub async fn search_web(&self, query: &str) -> Option<String> {
        let gathered = self.gather(query).await;

        if let Some(ref text) = gathered.instant {
            if text.trim().chars().count() > self.config.min_abstract_chars {
                return gathered.instant;
            }
        }

        if !gathered.news.is_empty() {
            let digest = format_news_digest(&gathered.news, self.config.description_chars);
            return Some(format!(
                "INFORMAÇÕES RECENTES ENCONTRADAS SOBRE \"{query}\":\n\n{digest}\n\n\
                 [Use essas informações para responder a pergunta do usuário de forma atualizada e precisa.]"
            ));
        }

        gathered.instant
    }

    /// Specialised lookup: the query is prefixed with the domain label and
    /// both sources are combined under labelled sections.
    pub async fn search_domain(&self, hint: DomainHint, query: &str) -> Option<String> {
        let Some(label) = hint.query_prefix() else {
            return self.search_web(query).await;
        };
        let gathered = self.gather(&format!("{label} {query}")).await;

        let mut combined = String::new();

        if let Some(ref text) = gathered.instant {
            if text.trim().chars().count() > self.config.min_abstract_chars {
                combined.push_str(&format!(
                    "INFORMAÇÕES SOBRE {}:\n{text}\n\n",
                    label.to_uppercase()
                ));
            }
        }

        if !gathered.news.is_empty() {
            combined.push_str(&format!(
                "NOTÍCIAS RECENTES ({} encontradas):\n\n{}",
                gathered.news.len(),
                format_news_digest(&gathered.news, self.config.description_chars)
            ));
        }

        let combined = combined.trim();
        if !combined.is_empty() {
            return Some(combined.to_owned());
        }

        gathered.instant
    }

    /// Fan out to both sources concurrently and settle each independently.
    async fn gather(&self, query: &str) -> Gathered {
        tracing::trace!(query, "gathering snippets");

        let (instant, news) = futures::join!(
            self.instant.lookup(query, &self.config),
            self.news.lookup(query, &self.config),
        );

        let instant = match instant {
            Ok(snippets) => snippets.into_iter().next().map(|s| s.text),
            Err(err) => {
                tracing::warn!(source = %self.instant.kind(), error = %err, "source lookup failed");
                None
            }
        };

        let news = match news {
            Ok(mut snippets) => {
                snippets.truncate(self.config.max_news_items);
                snippets
            }
            Err(err) => {
                tracing::warn!(source = %self.news.kind(), error = %err, "source lookup failed");
                Vec::new()
            }
        };

        tracing::debug!(
            instant = instant.is_some(),
            news = news.len(),
            "snippet sources settled"
        );
        Gathered { instant, news }
    }
}

/// Format headlines as a numbered digest.
///
/// Each entry carries the title, the description truncated to
/// `description_chars` characters, the link, and the publication date.
pub fn format_news_digest(news: &[WebSnippet], description_chars: usize) -> String {
    news.iter()
        .enumerate()
        .map(|(i, n)| {
            let description = n
                .description
                .as_deref()
                .filter(|d| !d.is_empty())
                .map(|d| d.chars().take(description_chars).collect::<String>())
                .unwrap_or_else(|| "Sem descrição".to_owned());
            format!(
                "{}. **{}**\n   {description}...\n   Fonte: {}\n   Data: {}",
                i + 1,
                n.text,
                n.url.as_deref().unwrap_or("N/A"),
                n.published_at.as_deref().unwrap_or("Recente"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
