//! Recording doubles for the external collaborators.
//!
//! Shared by the unit tests and the integration tests under `tests/`.

use async_trait::async_trait;
use cangalha_search::DomainHint;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::{AssistantError, Result};
use crate::llm::{CompletionError, CompletionService, Message, RequestOptions};
use crate::platform::{Camera, HostOs, Platform, Theme};
use crate::speech::{SpeechOutcome, SpeechOutput, Voice};
use crate::web::WebLookup;

/// A side effect requested through [`Platform`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// `open_url`.
    OpenUrl(String),
    /// `display`.
    Display(String),
    /// `display_rich`.
    DisplayRich(String),
    /// `apply_theme`.
    Theme(Theme),
    /// `notify`.
    Notify {
        /// Notification title.
        title: String,
        /// Notification body.
        body: String,
    },
}

/// Platform that records every call.
#[derive(Debug)]
pub struct RecordingPlatform {
    host: HostOs,
    events: Mutex<Vec<PlatformEvent>>,
}

impl RecordingPlatform {
    /// Recorder reporting `host` as the operating system.
    pub fn new(host: HostOs) -> Self {
        Self {
            host,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Every recorded event, in order.
    pub fn events(&self) -> Vec<PlatformEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// URLs opened, in order.
    pub fn opened_urls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PlatformEvent::OpenUrl(url) => Some(url),
                _ => None,
            })
            .collect()
    }

    /// Plain and rich display texts, in order.
    pub fn displayed(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PlatformEvent::Display(text) | PlatformEvent::DisplayRich(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Notifications raised, as (title, body).
    pub fn notifications(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                PlatformEvent::Notify { title, body } => Some((title, body)),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: PlatformEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

impl Default for RecordingPlatform {
    fn default() -> Self {
        Self::new(HostOs::Linux)
    }
}

impl Platform for RecordingPlatform {
    fn open_url(&self, url: &str) {
        self.push(PlatformEvent::OpenUrl(url.to_owned()));
    }

    fn display(&self, text: &str) {
        self.push(PlatformEvent::Display(text.to_owned()));
    }

    fn display_rich(&self, markdown: &str) {
        self.push(PlatformEvent::DisplayRich(markdown.to_owned()));
    }

    fn apply_theme(&self, theme: Theme) {
        self.push(PlatformEvent::Theme(theme));
    }

    fn notify(&self, title: &str, body: &str) {
        self.push(PlatformEvent::Notify {
            title: title.to_owned(),
            body: body.to_owned(),
        });
    }

    fn host_os(&self) -> HostOs {
        self.host
    }
}

/// Speech output that records what it was asked to say.
#[derive(Debug, Default)]
pub struct RecordingSpeech {
    voices: Vec<Voice>,
    spoken: Mutex<Vec<String>>,
    selected: Mutex<Option<Voice>>,
}

impl RecordingSpeech {
    /// Recorder advertising `voices`.
    pub fn with_voices(voices: Vec<Voice>) -> Self {
        Self {
            voices,
            ..Default::default()
        }
    }

    /// Everything spoken, in order.
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The last voice selected.
    pub fn selected_voice(&self) -> Option<Voice> {
        self.selected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl SpeechOutput for RecordingSpeech {
    async fn speak(&self, text: &str) -> SpeechOutcome {
        self.spoken
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_owned());
        SpeechOutcome::Completed
    }

    fn cancel(&self) {}

    fn voices(&self) -> Vec<Voice> {
        self.voices.clone()
    }

    fn set_voice(&self, voice: &Voice) {
        *self.selected.lock().unwrap_or_else(|e| e.into_inner()) = Some(voice.clone());
    }
}

/// One recorded completion call.
#[derive(Debug, Clone)]
pub struct CompletionCall {
    /// Messages sent.
    pub messages: Vec<Message>,
    /// Options used.
    pub options: RequestOptions,
}

/// Completion service replaying scripted results.
///
/// Once the script is exhausted every call fails with
/// [`CompletionError::EmptyResponse`].
#[derive(Debug, Default)]
pub struct ScriptedCompletion {
    script: Mutex<VecDeque<std::result::Result<String, CompletionError>>>,
    calls: Mutex<Vec<CompletionCall>>,
}

impl ScriptedCompletion {
    /// Service answering each call with the next reply.
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Service failing the first call with `error`.
    pub fn failing(error: CompletionError) -> Self {
        Self {
            script: Mutex::new(VecDeque::from([Err(error)])),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call received.
    pub fn calls(&self) -> Vec<CompletionCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl CompletionService for ScriptedCompletion {
    async fn complete(
        &self,
        messages: &[Message],
        options: &RequestOptions,
    ) -> std::result::Result<String, CompletionError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(CompletionCall {
                messages: messages.to_vec(),
                options: options.clone(),
            });
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Err(CompletionError::EmptyResponse))
    }
}

/// Web lookup returning fixed results and recording queries.
#[derive(Debug, Default)]
pub struct CannedWeb {
    aggregate: Option<String>,
    search: Option<String>,
    queries: Mutex<Vec<(String, Option<DomainHint>)>>,
}

impl CannedWeb {
    /// Lookup answering `aggregate` and `search_web` with the given texts.
    pub fn new(aggregate: Option<&str>, search: Option<&str>) -> Self {
        Self {
            aggregate: aggregate.map(str::to_owned),
            search: search.map(str::to_owned),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Queries received: `Some(hint)` for `aggregate`, `None` for `search_web`.
    pub fn queries(&self) -> Vec<(String, Option<DomainHint>)> {
        self.queries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, query: &str, hint: Option<DomainHint>) {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((query.to_owned(), hint));
    }
}

#[async_trait]
impl WebLookup for CannedWeb {
    async fn aggregate(&self, query: &str, hint: DomainHint) -> Option<String> {
        self.record(query, Some(hint));
        self.aggregate.clone()
    }

    async fn search_web(&self, query: &str) -> Option<String> {
        self.record(query, None);
        self.search.clone()
    }
}

/// Camera serving a fixed frame.
#[derive(Debug, Clone)]
pub struct FakeCamera {
    available: bool,
    frame: Vec<u8>,
}

impl FakeCamera {
    /// A present camera returning `frame`.
    pub fn with_frame(frame: Vec<u8>) -> Self {
        Self {
            available: true,
            frame,
        }
    }

    /// No capture device.
    pub fn absent() -> Self {
        Self {
            available: false,
            frame: Vec::new(),
        }
    }
}

#[async_trait]
impl Camera for FakeCamera {
    async fn is_available(&self) -> bool {
        self.available
    }

    async fn capture_jpeg(&self) -> Result<Vec<u8>> {
        if self.available {
            Ok(self.frame.clone())
        } else {
            Err(AssistantError::Camera("no device".into()))
        }
    }
}
