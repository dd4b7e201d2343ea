//! End-to-end turns through the assistant.
//!
//! The completion service is a real [`OpenAiClient`] pointed at a mock
//! server; platform, speech and web lookups are recording doubles; state is
//! persisted to a temporary directory.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use cangalha::config::AssistantConfig;
use cangalha::history::MAX_HISTORY;
use cangalha::llm::OpenAiClient;
use cangalha::prompt::PromptShape;
use cangalha::test_utils::{CannedWeb, RecordingPlatform, RecordingSpeech};
use cangalha::web::WebLookup;
use cangalha::{Assistant, Collaborators, HistoryStore, LocalStore, Origin, Session, Turn};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Rig {
    _dir: TempDir,
    platform: Arc<RecordingPlatform>,
    speech: Arc<RecordingSpeech>,
    assistant: Assistant,
}

fn reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    }))
}

fn rig(server: &MockServer, web: Option<CannedWeb>) -> Rig {
    let dir = tempfile::tempdir().expect("tempdir");
    rig_in(dir, server, web)
}

fn rig_in(dir: TempDir, server: &MockServer, web: Option<CannedWeb>) -> Rig {
    let mut config = AssistantConfig::default();
    config.completion.api_key = Some("sk-test".into());
    config.completion.base_url = server.uri();

    let platform = Arc::new(RecordingPlatform::default());
    let speech = Arc::new(RecordingSpeech::default());
    let store = Arc::new(LocalStore::open(dir.path()).expect("open store"));
    let assistant = Assistant::new(
        &config,
        Collaborators {
            platform: platform.clone(),
            speech: speech.clone(),
            completion: Arc::new(OpenAiClient::new(&config.completion).unwrap()),
            store,
            web: web.map(|w| Arc::new(w) as Arc<dyn WebLookup>),
            camera: None,
        },
    );
    Rig {
        _dir: dir,
        platform,
        speech,
        assistant,
    }
}

#[tokio::test]
async fn open_site_command_never_calls_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("não deveria ser chamado"))
        .expect(0)
        .mount(&server)
        .await;

    let rig = rig(&server, None);
    let turn = rig.assistant.handle("Abrir YouTube", Origin::Voice).await;
    assert!(matches!(turn, Turn::Command(_)));
    assert_eq!(rig.platform.opened_urls(), vec!["https://www.youtube.com"]);
    assert_eq!(rig.speech.spoken(), vec!["Abrindo YouTube"]);
}

#[tokio::test]
async fn spoken_calculations() {
    let server = MockServer::start().await;
    let rig = rig(&server, None);

    for (utterance, expected) in [
        ("calcular 2 mais 2", "O resultado é 4"),
        ("calcular raiz quadrada de 16", "O resultado é 4"),
        ("calcule 10 dividido por 3", "O resultado é 3.3333"),
        ("calcular 1 dividido por 0", "Desculpe, não consegui realizar esse cálculo. Por favor, tente uma expressão mais simples."),
    ] {
        rig.assistant.handle(utterance, Origin::Voice).await;
        assert_eq!(rig.speech.spoken().last().map(String::as_str), Some(expected));
    }
}

#[tokio::test]
async fn weather_question_sends_snippet_enriched_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_string_contains("DADOS ENCONTRADOS NA WEB"))
        .and(body_string_contains("Máxima de 28°C"))
        .and(body_string_contains("Comece a resposta com o fato concreto"))
        .respond_with(reply("Hoje em São Paulo a máxima é de 28°C com 60% de chance de chuva."))
        .expect(1)
        .mount(&server)
        .await;

    let web = CannedWeb::new(Some("São Paulo hoje: Máxima de 28°C, chuva 60%"), None);
    let rig = rig(&server, Some(web));
    let turn = rig
        .assistant
        .handle("qual a previsão do tempo em São Paulo", Origin::Typed)
        .await;

    let Turn::Reply(reply) = turn else {
        panic!("expected a reply");
    };
    assert_eq!(reply.shape, PromptShape::SnippetEnriched);
    assert!(reply.assertive);
    assert!(rig.speech.spoken().is_empty());
    assert_eq!(rig.assistant.history().len(), 1);
}

#[tokio::test]
async fn live_question_without_snippets_suggests_web_search() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("temporariamente indisponível"))
        .and(body_string_contains("buscar na web"))
        .respond_with(reply("A busca está indisponível, mas o último placar que conheço foi 2 x 0."))
        .expect(1)
        .mount(&server)
        .await;

    let rig = rig(&server, Some(CannedWeb::new(None, None)));
    let turn = rig
        .assistant
        .handle("qual o placar do jogo do Corinthians hoje", Origin::Typed)
        .await;
    let Turn::Reply(reply) = turn else {
        panic!("expected a reply");
    };
    assert_eq!(reply.shape, PromptShape::SearchUnavailable);
}

#[tokio::test]
async fn history_is_capped_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = Arc::new(LocalStore::open(dir.path()).unwrap());
        let history = HistoryStore::new(store);
        for i in 0..=MAX_HISTORY {
            history.add(format!("pergunta {i}"), format!("resposta {i}")).unwrap();
        }
    }

    let server = MockServer::start().await;
    let rig = rig_in(dir, &server, None);
    let history = rig.assistant.history();
    assert_eq!(history.len(), MAX_HISTORY);
    let all = history.all();
    assert_eq!(all[0].user, format!("pergunta {MAX_HISTORY}"));
    assert_eq!(all[MAX_HISTORY - 1].user, "pergunta 1");
}

#[tokio::test]
async fn prior_exchanges_are_sent_oldest_first() {
    let dir = tempfile::tempdir().unwrap();
    {
        let history = HistoryStore::new(Arc::new(LocalStore::open(dir.path()).unwrap()));
        for i in 1..=7 {
            history.add(format!("p{i}"), format!("r{i}")).unwrap();
        }
    }

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(wiremock::matchers::body_partial_json(json!({
            "messages": [
                {"role": "user", "content": "p3"},
                {"role": "assistant", "content": "r3"},
                {"role": "user", "content": "p4"},
                {"role": "assistant", "content": "r4"},
                {"role": "user", "content": "p5"},
                {"role": "assistant", "content": "r5"},
                {"role": "user", "content": "p6"},
                {"role": "assistant", "content": "r6"},
                {"role": "user", "content": "p7"},
                {"role": "assistant", "content": "r7"},
                {"role": "user", "content": "e a próxima?"}
            ]
        })))
        .respond_with(reply("A próxima é a oitava pergunta da conversa."))
        .expect(1)
        .mount(&server)
        .await;

    let rig = rig_in(dir, &server, None);
    let turn = rig.assistant.handle("e a próxima?", Origin::Typed).await;
    assert!(matches!(turn, Turn::Reply(_)));
}

#[tokio::test]
async fn disabled_speech_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    Session::new(Arc::new(LocalStore::open(dir.path()).unwrap()))
        .set_speak_enabled(false)
        .unwrap();

    let server = MockServer::start().await;
    let rig = rig_in(dir, &server, None);
    assert!(!rig.assistant.session().speak_enabled());
    rig.assistant.handle("que horas são", Origin::Voice).await;
    assert!(rig.speech.spoken().is_empty());
    assert!(rig.platform.displayed()[0].starts_with("São exatamente "));
}

#[tokio::test]
async fn upstream_error_is_shown_and_not_recorded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"message": "quota", "type": "insufficient_quota", "code": "insufficient_quota"}
        })))
        .mount(&server)
        .await;

    let rig = rig(&server, None);
    let turn = rig
        .assistant
        .handle("me conte sobre a história do Brasil", Origin::Voice)
        .await;
    assert!(matches!(turn, Turn::Failed(_)));
    assert!(rig.platform.displayed()[0].contains("Cota da API excedida"));
    assert_eq!(
        rig.speech.spoken(),
        vec!["A cota da API foi excedida. Verifique seus créditos."]
    );
    assert!(rig.assistant.history().is_empty());
}
