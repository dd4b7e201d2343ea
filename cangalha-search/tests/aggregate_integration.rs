//! Integration tests for the aggregation pipeline over real HTTP.
//!
//! Both sources are pointed at a local mock server through the direct route
//! only, so the full fetch → parse → merge path runs without touching the
//! network.

use cangalha_search::{aggregate, search_web, DomainHint, Route, SearchConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel>
<item><title>Palmeiras 2 x 1 Santos - ge</title><link>https://ge.example/1</link><pubDate>Sun, 03 Nov 2024 18:30:00 GMT</pubDate><description>Gols no segundo tempo</description></item>
<item><title>Flamengo empata fora de casa</title><link>https://ge.example/2</link></item>
</channel></rss>"#;

fn config_for(server: &MockServer) -> SearchConfig {
    SearchConfig {
        routes: vec![Route::Direct],
        timeout_seconds: 2,
        instant_answer_url: server.uri(),
        news_feed_url: server.uri(),
        user_agent: Some("CangalhaTest/1.0".into()),
        ..Default::default()
    }
}

async fn mount_instant_answer(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_feed(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path("/rss/search"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn instant_answer_abstract_is_returned() {
    let server = MockServer::start().await;
    mount_instant_answer(
        &server,
        json!({"AbstractText": "O Brasileirão é a principal competição de futebol do Brasil."}),
    )
    .await;
    mount_feed(&server, 200, FEED).await;

    let text = search_web("brasileirão", &config_for(&server)).await;
    assert_eq!(
        text.as_deref(),
        Some("O Brasileirão é a principal competição de futebol do Brasil.")
    );
}

#[tokio::test]
async fn feed_digest_used_when_instant_answer_empty() {
    let server = MockServer::start().await;
    mount_instant_answer(&server, json!({"AbstractText": "", "Answer": ""})).await;
    mount_feed(&server, 200, FEED).await;

    let text = search_web("placar palmeiras", &config_for(&server))
        .await
        .expect("digest");
    assert!(text.contains("1. **Palmeiras 2 x 1 Santos - ge**"));
    assert!(text.contains("Gols no segundo tempo..."));
    assert!(text.contains("Fonte: https://ge.example/1"));
    assert!(text.contains("2. **Flamengo empata fora de casa**"));
}

#[tokio::test]
async fn sports_hint_combines_sections() {
    let server = MockServer::start().await;
    mount_instant_answer(
        &server,
        json!({"AbstractText": "O Palmeiras venceu o Santos por 2 a 1 neste domingo."}),
    )
    .await;
    mount_feed(&server, 200, FEED).await;

    let text = aggregate("palmeiras", DomainHint::Sports, &config_for(&server))
        .await
        .expect("combined");
    assert!(text.starts_with("INFORMAÇÕES SOBRE ESPORTES:"));
    assert!(text.contains("NOTÍCIAS RECENTES (2 encontradas)"));
}

#[tokio::test]
async fn every_source_failing_resolves_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = config_for(&server);
    assert!(search_web("qualquer coisa", &config).await.is_none());
    assert!(aggregate("qualquer coisa", DomainHint::Weather, &config)
        .await
        .is_none());
}

#[tokio::test]
async fn malformed_bodies_resolve_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>captcha</html>"))
        .mount(&server)
        .await;
    mount_feed(&server, 200, "<html><body>Access denied</body></html>").await;

    assert!(search_web("teste", &config_for(&server)).await.is_none());
}

#[tokio::test]
async fn unreachable_host_resolves_to_none() {
    let config = SearchConfig {
        routes: vec![Route::Direct],
        timeout_seconds: 1,
        instant_answer_url: "http://127.0.0.1:9".into(),
        news_feed_url: "http://127.0.0.1:9".into(),
        ..Default::default()
    };
    assert!(aggregate("teste", DomainHint::General, &config).await.is_none());
}
