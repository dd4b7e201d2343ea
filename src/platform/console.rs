//! Terminal implementations of the platform collaborators.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{Camera, HostOs, Platform, Theme};
use crate::error::{AssistantError, Result};
use crate::speech::{SpeechOutcome, SpeechOutput, Voice};

/// Prints everything to stdout; URLs are shown, not launched.
#[derive(Debug, Clone)]
pub struct ConsolePlatform {
    host: HostOs,
}

impl ConsolePlatform {
    /// Console platform reporting the current host OS.
    pub fn new() -> Self {
        Self {
            host: HostOs::current(),
        }
    }
}

impl Default for ConsolePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for ConsolePlatform {
    fn open_url(&self, url: &str) {
        tracing::info!(url, "open url");
        println!("🔗 {url}");
    }

    fn display(&self, text: &str) {
        println!("{text}");
    }

    fn display_rich(&self, markdown: &str) {
        println!("{markdown}");
    }

    fn apply_theme(&self, theme: Theme) {
        tracing::debug!(%theme, "theme applied");
    }

    fn notify(&self, title: &str, body: &str) {
        println!("🔔 {title}: {body}");
    }

    fn host_os(&self) -> HostOs {
        self.host
    }
}

/// Writes spoken lines to stderr, prefixed with the selected voice.
#[derive(Debug)]
pub struct ConsoleSpeech {
    voices: Vec<Voice>,
    selected: Mutex<Option<Voice>>,
}

impl ConsoleSpeech {
    pub fn new() -> Self {
        Self {
            voices: vec![Voice::new("Terminal", "pt-BR")],
            selected: Mutex::new(None),
        }
    }
}

impl Default for ConsoleSpeech {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechOutput for ConsoleSpeech {
    async fn speak(&self, text: &str) -> SpeechOutcome {
        let voice = self
            .selected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or_else(|| "Terminal".to_owned(), |v| v.name.clone());
        eprintln!("🗣  [{voice}] {text}");
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

/// "Camera" that returns the bytes of an image file.
#[derive(Debug, Clone)]
pub struct ImageFileCamera {
    path: PathBuf,
}

impl ImageFileCamera {
    /// Serve frames from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Camera for ImageFileCamera {
    async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.path)
            .await
            .is_ok_and(|m| m.is_file())
    }

    async fn capture_jpeg(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| AssistantError::Camera(format!("{}: {e}", self.path.display())))
    }
}
