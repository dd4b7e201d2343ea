//! Platform collaborators: UI surface, browser navigation, notifications and
//! camera capture.
//!
//! The dispatch core only decides *what* to call with *which* arguments;
//! these traits are the seam where a browser shell, desktop app or the
//! console CLI plug in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod console;

pub use console::{ConsolePlatform, ConsoleSpeech, ImageFileCamera};

/// UI colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light appearance.
    Light,
    /// Dark appearance.
    Dark,
}

impl Theme {
    /// Stored name ("light" / "dark").
    pub fn name(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Portuguese adjective used in confirmations.
    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "claro",
            Self::Dark => "escuro",
        }
    }

    /// Parse a stored name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host operating system family, used to pick app-launch URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    /// Microsoft Windows.
    Windows,
    /// Apple macOS.
    MacOs,
    /// Desktop Linux.
    Linux,
    /// Android.
    Android,
    /// iPhone / iPad.
    Ios,
    /// Anything else.
    Unknown,
}

impl HostOs {
    /// The OS this process runs on.
    pub fn current() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::MacOs,
            "linux" => Self::Linux,
            "android" => Self::Android,
            "ios" => Self::Ios,
            _ => Self::Unknown,
        }
    }

    /// Classify a browser User-Agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_lowercase();
        if ua.contains("windows") {
            Self::Windows
        } else if ua.contains("iphone") || ua.contains("ipad") {
            Self::Ios
        } else if ua.contains("mac os x") {
            Self::MacOs
        } else if ua.contains("android") {
            Self::Android
        } else if ua.contains("linux") {
            Self::Linux
        } else {
            Self::Unknown
        }
    }
}

/// UI and browser side effects.
pub trait Platform: Send + Sync {
    /// Open `url`, in a new tab where that applies.
    fn open_url(&self, url: &str);

    /// Replace the visible content with plain text.
    fn display(&self, text: &str);

    /// Replace the visible content with markdown (links, images, bold).
    fn display_rich(&self, markdown: &str);

    /// Apply a colour scheme.
    fn apply_theme(&self, theme: Theme);

    /// Raise a native notification, if permitted.
    fn notify(&self, title: &str, body: &str);

    /// Host operating system.
    fn host_os(&self) -> HostOs;
}

/// Still-image capture.
#[async_trait]
pub trait Camera: Send + Sync {
    /// Whether a capture device is present.
    async fn is_available(&self) -> bool;

    /// Capture one JPEG frame.
    async fn capture_jpeg(&self) -> crate::error::Result<Vec<u8>>;
}
