//! DuckDuckGo Instant Answer source.
//!
//! Queries the JSON API at `api.duckduckgo.com` and returns the first
//! informative field among the abstract, the direct answer, the first
//! related topic, and the dictionary definition.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::route::first_success;
use crate::source::SnippetSource;
use crate::types::{SourceKind, WebSnippet};

/// Fields shorter than this carry no information worth forwarding.
const MIN_FIELD_CHARS: usize = 10;

/// DuckDuckGo Instant Answer lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantAnswerSource;

impl InstantAnswerSource {
    /// Build the API URL for `query` against `base_url`.
    pub fn target_url(base_url: &str, query: &str) -> String {
        let q: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!(
            "{}/?q={q}&format=json&no_html=1&skip_disambig=1",
            base_url.trim_end_matches('/')
        )
    }
}

impl SnippetSource for InstantAnswerSource {
    async fn lookup(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<WebSnippet>, SearchError> {
        tracing::trace!(query, "instant answer lookup");

        let client = http::build_client(config)?;
        let target = Self::target_url(&config.instant_answer_url, query);

        let text = first_success("instant answer", &config.routes, |route| {
            let client = &client;
            let target = &target;
            async move {
                let body = http::fetch_text(client, route, target, "application/json").await?;
                parse_instant_answer(&body)
            }
        })
        .await?;

        Ok(vec![WebSnippet::text(SourceKind::InstantAnswer, text)])
    }

    fn kind(&self) -> SourceKind {
        SourceKind::InstantAnswer
    }
}

/// Extract the most informative text from an Instant Answer JSON body.
///
/// Returns `Ok(None)` when the response is well-formed but has nothing
/// useful, so the caller can move on to another route.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] if the body is not JSON.
pub(crate) fn parse_instant_answer(body: &str) -> Result<Option<String>, SearchError> {
    let data: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| SearchError::Parse(format!("instant answer JSON: {e}")))?;

    let informative = |v: Option<&serde_json::Value>| -> Option<String> {
        let text = v?.as_str()?.trim();
        (text.chars().count() > MIN_FIELD_CHARS).then(|| text.to_owned())
    };

    let found = informative(data.get("AbstractText"))
        .or_else(|| informative(data.get("Answer")))
        .or_else(|| {
            informative(
                data.get("RelatedTopics")
                    .and_then(|topics| topics.get(0))
                    .and_then(|first| first.get("Text")),
            )
        })
        .or_else(|| informative(data.get("Definition")));

    tracing::debug!(found = found.is_some(), "instant answer parsed");
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_url_encodes_query() {
        let url = InstantAnswerSource::target_url("https://api.duckduckgo.com/", "fórmula 1");
        assert_eq!(
            url,
            "https://api.duckduckgo.com/?q=f%C3%B3rmula+1&format=json&no_html=1&skip_disambig=1"
        );
    }

    #[test]
    fn abstract_text_preferred() {
        let body = r#"{"AbstractText":"Brasília é a capital federal do Brasil.","Answer":"outra resposta longa"}"#;
        let text = parse_instant_answer(body).expect("parse");
        assert_eq!(text.as_deref(), Some("Brasília é a capital federal do Brasil."));
    }

    #[test]
    fn answer_used_when_abstract_short() {
        let body = r#"{"AbstractText":"curto","Answer":"1 dólar = 5,43 reais"}"#;
        let text = parse_instant_answer(body).expect("parse");
        assert_eq!(text.as_deref(), Some("1 dólar = 5,43 reais"));
    }

    #[test]
    fn non_string_answer_is_skipped() {
        let body = r#"{"AbstractText":"","Answer":{"from":"calculator"},"Definition":"Definição suficientemente longa"}"#;
        let text = parse_instant_answer(body).expect("parse");
        assert_eq!(text.as_deref(), Some("Definição suficientemente longa"));
    }

    #[test]
    fn first_related_topic_used() {
        let body = r#"{"AbstractText":"","Answer":"","RelatedTopics":[{"Text":"Rust is a programming language."},{"Text":"ignored"}]}"#;
        let text = parse_instant_answer(body).expect("parse");
        assert_eq!(text.as_deref(), Some("Rust is a programming language."));
    }

    #[test]
    fn empty_response_is_none() {
        let body = r#"{"AbstractText":"","Answer":"","RelatedTopics":[],"Definition":""}"#;
        assert!(parse_instant_answer(body).expect("parse").is_none());
    }

    #[test]
    fn malformed_body_is_parse_error() {
        let err = parse_instant_answer("<html>blocked</html>").unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn kind_is_instant_answer() {
        assert_eq!(InstantAnswerSource.kind(), SourceKind::InstantAnswer);
    }

    #[tokio::test]
    #[ignore] // Live test — run with `cargo test -- --ignored`
    async fn live_instant_answer() {
        let found = InstantAnswerSource
            .lookup("Rust programming language", &SearchConfig::default())
            .await;
        assert!(found.is_ok());
    }
}
