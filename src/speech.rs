//! Speech collaborators.
//!
//! Recognition and synthesis are platform services; the pipeline only sees
//! their outcomes. Synthesis is last-write-wins: starting a new utterance
//! cancels whatever is playing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A synthesis voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    /// Display name, e.g. "Microsoft Maria - Portuguese (Brazil)".
    pub name: String,
    /// BCP 47 language tag, e.g. "pt-BR".
    pub lang: String,
}

impl Voice {
    /// Build a voice.
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
        }
    }

    /// Whether the language tag is Portuguese (any region).
    pub fn is_portuguese(&self) -> bool {
        self.lang
            .get(..2)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("pt"))
    }
}

/// Voices whose language tag starts with `pt`.
pub fn portuguese_voices(voices: &[Voice]) -> Vec<Voice> {
    voices.iter().filter(|v| v.is_portuguese()).cloned().collect()
}

/// How a synthesis request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Played to the end.
    Completed,
    /// Superseded by a newer utterance.
    Interrupted,
    /// Cancelled explicitly.
    Canceled,
    /// Synthesis failed.
    Failed(String),
}

impl SpeechOutcome {
    /// Interruptions and cancellations are intentional, not errors.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Text-to-speech output.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// Speak `text`, cancelling any utterance in progress, and wait for it
    /// to end.
    async fn speak(&self, text: &str) -> SpeechOutcome;

    /// Stop the current utterance, if any.
    fn cancel(&self);

    /// Installed voices.
    fn voices(&self) -> Vec<Voice>;

    /// Select the voice used for subsequent utterances.
    fn set_voice(&self, voice: &Voice);
}

/// Speak `text` and log unexpected failures. Never fails.
pub async fn say(output: &dyn SpeechOutput, text: &str) {
    match output.speak(text).await {
        SpeechOutcome::Failed(reason) => {
            tracing::warn!(%reason, "speech synthesis failed");
        }
        outcome => tracing::trace!(?outcome, "speech finished"),
    }
}

/// Speech recognition failures reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// The platform has no recognition engine.
    #[error("speech recognition unsupported")]
    Unsupported,
    /// Microphone permission was refused.
    #[error("microphone permission denied")]
    PermissionDenied,
    /// Recognition ended without hearing anything.
    #[error("no speech detected")]
    NoSpeech,
    /// A newer recognition pass aborted this one.
    #[error("recognition aborted")]
    Aborted,
    /// Anything else.
    #[error("recognition error: {0}")]
    Other(String),
}

impl RecognitionError {
    /// User-facing advisory, or `None` when the condition is expected.
    pub fn advisory(&self) -> Option<&'static str> {
        match self {
            Self::Unsupported => Some(
                "Reconhecimento de voz não suportado neste navegador. Use o campo de texto.",
            ),
            Self::PermissionDenied => Some(
                "Permissão de microfone negada. Autorize o acesso ao microfone para usar comandos de voz.",
            ),
            Self::NoSpeech => Some("Não ouvi nada. Tente falar novamente."),
            Self::Aborted => None,
            Self::Other(_) => Some("Erro no reconhecimento de voz. Tente novamente."),
        }
    }

    /// Conditions that must be spoken even when the user was typing.
    pub fn is_safety_relevant(&self) -> bool {
        matches!(self, Self::Unsupported | Self::PermissionDenied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portuguese_filter_matches_any_region() {
        let voices = vec![
            Voice::new("Maria", "pt-BR"),
            Voice::new("Joana", "PT-pt"),
            Voice::new("Samantha", "en-US"),
            Voice::new("Broken", "p"),
        ];
        let names: Vec<_> = portuguese_voices(&voices)
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(names, ["Maria", "Joana"]);
    }

    #[test]
    fn interruptions_are_expected() {
        assert!(SpeechOutcome::Interrupted.is_expected());
        assert!(SpeechOutcome::Canceled.is_expected());
        assert!(!SpeechOutcome::Failed("audio device".into()).is_expected());
    }

    #[test]
    fn recognition_advisories() {
        assert!(RecognitionError::PermissionDenied.is_safety_relevant());
        assert!(RecognitionError::Unsupported.advisory().is_some());
        assert!(RecognitionError::Aborted.advisory().is_none());
        assert!(!RecognitionError::NoSpeech.is_safety_relevant());
    }
}
