//! Google News RSS search source.
//!
//! Fetches `news.google.com/rss/search` and extracts up to
//! `max_news_items` headlines with description, link and date. Feed bodies
//! arriving through proxies are frequently truncated or replaced by HTML
//! error pages, so extraction is deliberately tolerant: items are located
//! with patterns, and each field's markup and entities are stripped through
//! an HTML fragment parser.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::http;
use crate::route::first_success;
use crate::source::SnippetSource;
use crate::types::{SourceKind, WebSnippet};

/// Google News RSS search feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsFeedSource;

impl NewsFeedSource {
    /// Build the feed URL for `query` against `base_url`.
    pub fn target_url(base_url: &str, query: &str) -> String {
        let q: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!(
            "{}/rss/search?q={q}&hl=pt-BR&gl=BR&ceid=BR:pt-419",
            base_url.trim_end_matches('/')
        )
    }
}

impl SnippetSource for NewsFeedSource {
    async fn lookup(
        &self,
        query: &str,
        config: &SearchConfig,
    ) -> Result<Vec<WebSnippet>, SearchError> {
        tracing::trace!(query, "news feed lookup");

        let client = http::build_client(config)?;
        let target = Self::target_url(&config.news_feed_url, query);
        let max_items = config.max_news_items;

        first_success("news feed", &config.routes, |route| {
            let client = &client;
            let target = &target;
            async move {
                let body =
                    http::fetch_text(client, route, target, "application/xml, text/xml, */*")
                        .await?;
                let items = parse_news_feed(&body, max_items)?;
                Ok((!items.is_empty()).then_some(items))
            }
        })
        .await
    }

    fn kind(&self) -> SourceKind {
        SourceKind::NewsFeed
    }
}

fn field_regex(tag: &str) -> Regex {
    Regex::new(&format!(r"(?is)<{tag}\b[^>]*>(.*?)</{tag}>")).expect("feed field regex is valid")
}

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("item"));
static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("title"));
static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("description"));
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("link"));
static PUB_DATE_RE: LazyLock<Regex> = LazyLock::new(|| field_regex("pubDate"));
static CDATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("cdata regex is valid")
});

/// Parse an RSS body into at most `max_items` headline snippets.
///
/// Items without a title are skipped.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] when the body does not look like a feed at
/// all (for example, an HTML block page returned by a proxy).
pub(crate) fn parse_news_feed(xml: &str, max_items: usize) -> Result<Vec<WebSnippet>, SearchError> {
    let lower_head: String = xml.chars().take(512).collect::<String>().to_lowercase();
    if !lower_head.contains("<rss") && !lower_head.contains("<?xml") && !xml.contains("<item") {
        return Err(SearchError::Parse("response is not an RSS feed".into()));
    }

    let field = |re: &Regex, item: &str| -> Option<String> {
        let raw = re.captures(item)?.get(1)?.as_str();
        let unwrapped = CDATA_RE.replace_all(raw, "$1");
        let text = plain_text(&unwrapped);
        (!text.is_empty()).then_some(text)
    };

    let mut news = Vec::new();
    for caps in ITEM_RE.captures_iter(xml) {
        let Some(item) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        let Some(title) = field(&TITLE_RE, item) else {
            continue;
        };

        news.push(WebSnippet {
            source: SourceKind::NewsFeed,
            text: title,
            description: field(&DESCRIPTION_RE, item),
            url: field(&LINK_RE, item),
            published_at: field(&PUB_DATE_RE, item),
        });

        if news.len() >= max_items {
            break;
        }
    }

    tracing::debug!(count = news.len(), "news feed parsed");
    Ok(news)
}

/// Decode entities and drop markup from a feed field.
///
/// Feed descriptions are HTML escaped inside XML, so a second pass is needed
/// when the first decode still leaves tags behind.
fn plain_text(raw: &str) -> String {
    let once = fragment_text(raw);
    if once.contains('<') && once.contains('>') {
        fragment_text(&once)
    } else {
        once
    }
}

fn fragment_text(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>"f1" - Google Notícias</title>
<item>
  <title>Verstappen vence GP de Interlagos - Globo Esporte</title>
  <link>https://news.google.com/articles/abc</link>
  <pubDate>Sun, 03 Nov 2024 18:30:00 GMT</pubDate>
  <description>&lt;a href="https://ge.globo.com/x"&gt;Verstappen vence de virada&lt;/a&gt;&amp;nbsp;&amp;nbsp;&lt;font color="#6f6f6f"&gt;ge&lt;/font&gt;</description>
</item>
<item>
  <title><![CDATA[Norris &amp; Piastri no pódio]]></title>
  <link>https://news.google.com/articles/def</link>
</item>
<item>
  <title>   </title>
  <link>https://news.google.com/articles/empty</link>
</item>
<item>
  <title>Terceira notícia</title>
</item>
</channel></rss>"##;

    #[test]
    fn target_url_has_locale_parameters() {
        let url = NewsFeedSource::target_url("https://news.google.com", "placar hoje");
        assert_eq!(
            url,
            "https://news.google.com/rss/search?q=placar+hoje&hl=pt-BR&gl=BR&ceid=BR:pt-419"
        );
    }

    #[test]
    fn parses_items_with_titles() {
        let news = parse_news_feed(FEED, 5).expect("parse");
        assert_eq!(news.len(), 3);
        assert_eq!(news[0].text, "Verstappen vence GP de Interlagos - Globo Esporte");
        assert_eq!(news[0].url.as_deref(), Some("https://news.google.com/articles/abc"));
        assert_eq!(
            news[0].published_at.as_deref(),
            Some("Sun, 03 Nov 2024 18:30:00 GMT")
        );
        assert_eq!(news[2].text, "Terceira notícia");
        assert!(news[2].url.is_none());
    }

    #[test]
    fn escaped_description_markup_is_stripped() {
        let news = parse_news_feed(FEED, 5).expect("parse");
        let description = news[0].description.as_deref().expect("description");
        assert!(description.starts_with("Verstappen vence de virada"));
        assert!(!description.contains('<'));
        assert!(!description.contains("href"));
    }

    #[test]
    fn cdata_titles_are_unwrapped() {
        let news = parse_news_feed(FEED, 5).expect("parse");
        assert_eq!(news[1].text, "Norris & Piastri no pódio");
    }

    #[test]
    fn respects_max_items() {
        let news = parse_news_feed(FEED, 1).expect("parse");
        assert_eq!(news.len(), 1);
    }

    #[test]
    fn empty_channel_yields_no_items() {
        let news = parse_news_feed("<rss><channel></channel></rss>", 5).expect("parse");
        assert!(news.is_empty());
    }

    #[test]
    fn html_block_page_is_parse_error() {
        let err = parse_news_feed("<html><body>Access denied</body></html>", 5).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn kind_is_news_feed() {
        assert_eq!(NewsFeedSource.kind(), SourceKind::NewsFeed);
    }
}
