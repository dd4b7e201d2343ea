//! The turn pipeline.
//!
//! One utterance runs through the keyword matcher and, on a hit, the command
//! executor. Anything else goes to the completion service, enriched with web
//! snippets when the utterance asks for live data. A reply that hedges
//! schedules a delayed search-engine fallback.
//!
//! Only one utterance is processed at a time; input arriving while a turn is
//! in flight is dropped.

use std::sync::Arc;
use std::time::Duration;

use crate::assertiveness::AssertivenessClassifier;
use crate::commands::{CommandExecutor, KeywordMatcher, Outcome};
use crate::config::AssistantConfig;
use crate::history::HistoryStore;
use crate::llm::{CompletionError, CompletionService, RequestOptions};
use crate::platform::{Camera, Platform, Theme};
use crate::prompt::{PromptBuilder, PromptShape};
use crate::realtime::RealtimeDetector;
use crate::session::{Origin, OutputKind, Session};
use crate::speech::{self, RecognitionError, SpeechOutput};
use crate::storage::{LocalStore, THEME_KEY};
use crate::web::WebLookup;

/// External collaborators the assistant drives.
pub struct Collaborators {
    /// UI and browser side effects.
    pub platform: Arc<dyn Platform>,
    /// Speech synthesis.
    pub speech: Arc<dyn SpeechOutput>,
    /// Chat and vision completions.
    pub completion: Arc<dyn CompletionService>,
    /// Durable key/value state.
    pub store: Arc<LocalStore>,
    /// Live web lookups; `None` disables enrichment and the web-search command.
    pub web: Option<Arc<dyn WebLookup>>,
    /// Capture device for the camera commands.
    pub camera: Option<Arc<dyn Camera>>,
}

/// A completion reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Raw reply text, shown and spoken unchanged.
    pub text: String,
    /// Whether the reply answered directly.
    pub assertive: bool,
    /// Prompt shape that produced it.
    pub shape: PromptShape,
}

/// What happened to one utterance.
#[derive(Debug)]
pub enum Turn {
    /// Another utterance was still being processed.
    Dropped,
    /// Nothing but whitespace.
    Ignored,
    /// A built-in command ran.
    Command(Outcome),
    /// The completion service answered.
    Reply(Reply),
    /// The completion call failed; the user has been told.
    Failed(CompletionError),
}

/// The voice assistant.
pub struct Assistant {
    matcher: KeywordMatcher,
    executor: CommandExecutor,
    detector: RealtimeDetector,
    prompts: PromptBuilder,
    classifier: AssertivenessClassifier,
    completion: Arc<dyn CompletionService>,
    web: Option<Arc<dyn WebLookup>>,
    platform: Arc<dyn Platform>,
    speech: Arc<dyn SpeechOutput>,
    session: Arc<Session>,
    store: Arc<LocalStore>,
    options: RequestOptions,
    history_window: usize,
    fallback_delay: Duration,
}

impl Assistant {
    /// Assemble the pipeline from `config` and the collaborators.
    pub fn new(config: &AssistantConfig, collaborators: Collaborators) -> Self {
        let Collaborators {
            platform,
            speech,
            completion,
            store,
            web,
            camera,
        } = collaborators;

        let session = Arc::new(Session::new(Arc::clone(&store)));
        let mut executor = CommandExecutor::new(
            Arc::clone(&platform),
            Arc::clone(&speech),
            Arc::clone(&store),
            Arc::clone(&session),
        )
        .with_vision(Arc::clone(&completion))
        .with_completion_config(config.completion.clone())
        .with_dispatch_config(config.dispatch.clone());
        if let Some(web) = &web {
            executor = executor.with_web(Arc::clone(web));
        }
        if let Some(camera) = camera {
            executor = executor.with_camera(camera);
        }

        Self {
            matcher: KeywordMatcher::new(),
            executor,
            detector: RealtimeDetector::new(&config.heuristics),
            prompts: PromptBuilder::new(&config.heuristics),
            classifier: AssertivenessClassifier::new(&config.heuristics),
            completion,
            web,
            platform,
            speech,
            session,
            store,
            options: RequestOptions::chat(&config.completion),
            history_window: config.dispatch.history_window,
            fallback_delay: Duration::from_millis(config.dispatch.fallback_search_delay_ms),
        }
    }

    /// Replace the built-in trigger table.
    pub fn with_matcher(mut self, matcher: KeywordMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        self.executor.history()
    }

    /// Process one utterance end to end.
    pub async fn handle(&self, utterance: &str, origin: Origin) -> Turn {
        let text = utterance.trim();
        if text.is_empty() {
            return Turn::Ignored;
        }
        let Some(_guard) = self.session.try_begin() else {
            tracing::debug!("utterance dropped, another is in flight");
            return Turn::Dropped;
        };

        self.session.record_origin(origin);
        let should_speak = self.session.should_vocalize(OutputKind::Reply);

        let matched = self.matcher.match_utterance(text);
        if let Some(category) = matched.category {
            let outcome = self
                .executor
                .execute(category, matched.parameter.as_deref(), should_speak)
                .await;
            if let (true, Some(line)) = (outcome.vocalize, outcome.speech.as_deref()) {
                speech::say(self.speech.as_ref(), line).await;
            }
            return Turn::Command(outcome);
        }

        self.converse(text, should_speak).await
    }

    async fn converse(&self, text: &str, should_speak: bool) -> Turn {
        let needs_live = self.detector.needs_live_data(text);
        let snippet = match (&self.web, needs_live) {
            (Some(web), true) => {
                let hint = self.detector.domain_hint(text);
                tracing::debug!(%hint, "live data needed");
                web.aggregate(text, hint).await
            }
            _ => None,
        };

        let context = self.history().context_window(self.history_window);
        let payload = self
            .prompts
            .build(text, snippet.as_deref(), needs_live, &context);

        let reply = match self.completion.complete(&payload.messages, &self.options).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, kind = ?e.kind(), "completion failed");
                self.platform.display(e.user_message());
                if should_speak {
                    speech::say(self.speech.as_ref(), e.spoken_summary()).await;
                }
                return Turn::Failed(e);
            }
        };

        if let Err(e) = self.history().add(text, reply.as_str()) {
            tracing::warn!(error = %e, "failed to record exchange");
        }
        self.platform.display_rich(&reply);
        if should_speak {
            speech::say(self.speech.as_ref(), &reply).await;
        }

        let assertive = self.classifier.is_assertive(&reply);
        if !assertive {
            tracing::debug!(hedge = ?self.classifier.find_hedge(&reply), "reply not assertive");
            self.schedule_fallback_search(text);
        }

        Turn::Reply(Reply {
            text: reply,
            assertive,
            shape: payload.shape,
        })
    }

    fn schedule_fallback_search(&self, query: &str) {
        let url = format!(
            "https://www.google.com/search?q={}",
            urlencoding::encode(query)
        );
        let platform = Arc::clone(&self.platform);
        let delay = self.fallback_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::debug!("opening fallback search");
            platform.open_url(&url);
        });
    }

    /// Surface a recognition failure.
    ///
    /// Unsupported recognition and a denied microphone are spoken even when
    /// the last interaction was typed.
    pub async fn report_recognition_error(&self, error: &RecognitionError) {
        let Some(advisory) = error.advisory() else {
            return;
        };
        tracing::info!(%error, "speech recognition failed");
        self.platform.display(advisory);

        let kind = if error.is_safety_relevant() {
            OutputKind::SafetyAdvisory
        } else {
            OutputKind::Reply
        };
        if self.session.should_vocalize(kind) {
            speech::say(self.speech.as_ref(), advisory).await;
        }
    }

    /// Re-apply the persisted theme, if any.
    pub fn restore_theme(&self) -> Option<Theme> {
        let name: Option<String> = self.store.get(THEME_KEY, None);
        let theme = name.as_deref().and_then(Theme::from_name)?;
        self.platform.apply_theme(theme);
        Some(theme)
    }
}
