//! Keyword-triggered local commands.
//!
//! Each [`CommandCategory`] owns an ordered set of Portuguese trigger
//! phrases. [`CATEGORY_ORDER`] is the dispatch priority: when an utterance
//! satisfies several categories, the earliest one wins.
//!
//! | Group | Categories |
//! |-------|------------|
//! | help | `Help` |
//! | open site | `OpenYouTube` … `OpenTwitter` |
//! | search | `SearchGoogle`, `SearchWikipedia` |
//! | clock | `Time`, `Date` |
//! | media | `Music`, `Weather`, `Joke` |
//! | theme | `DarkMode`, `LightMode` |
//! | tools | `Calculate`, `Timer`, `Translate`, `Reminder` |
//! | audio | `VolumeUp`, `VolumeDown`, `ListVoices`, `ChangeVoice` |
//! | apps | `OpenCalculator`, `OpenNotepad`, `OpenSettings` |
//! | camera | `Camera`, `ReadDocument` |
//! | history | `ClearHistory`, `ShowHistory` |
//! | web | `WebSearch` |

pub mod calc;
pub mod clock;
pub mod executor;
pub mod matcher;

pub use executor::{CommandExecutor, Outcome};
pub use matcher::{KeywordMatcher, MatchResult};

use std::fmt;

/// A local command family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCategory {
    /// List every command phrase.
    Help,
    /// Open youtube.com.
    OpenYouTube,
    /// Open google.com.
    OpenGoogle,
    /// Open linkedin.com.
    OpenLinkedIn,
    /// Open facebook.com.
    OpenFacebook,
    /// Open instagram.com.
    OpenInstagram,
    /// Open twitter.com.
    OpenTwitter,
    /// Google search for the parameter.
    SearchGoogle,
    /// Wikipedia article for the parameter.
    SearchWikipedia,
    /// Current local time.
    Time,
    /// Current local date.
    Date,
    /// Open YouTube Music.
    Music,
    /// Open the weather page.
    Weather,
    /// Random joke.
    Joke,
    /// Switch to the dark theme.
    DarkMode,
    /// Switch to the light theme.
    LightMode,
    /// Evaluate an arithmetic expression.
    Calculate,
    /// Restart the stopwatch.
    Timer,
    /// Open a translation of the parameter.
    Translate,
    /// Schedule a reminder.
    Reminder,
    /// Volume up acknowledgement.
    VolumeUp,
    /// Volume down acknowledgement.
    VolumeDown,
    /// List Portuguese voices.
    ListVoices,
    /// Switch to a random Portuguese voice.
    ChangeVoice,
    /// Launch the OS calculator.
    OpenCalculator,
    /// Launch the OS text editor.
    OpenNotepad,
    /// Launch the OS settings.
    OpenSettings,
    /// Identify objects through the camera.
    Camera,
    /// Read a document through the camera.
    ReadDocument,
    /// Delete the conversation history.
    ClearHistory,
    /// Show recent conversation history.
    ShowHistory,
    /// Live web lookup for the parameter.
    WebSearch,
}

/// How the text surrounding a trigger affects a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Matches regardless of surrounding text.
    Fixed,
    /// The residual text is the parameter; an empty residual is no match.
    Parameter,
    /// Matches only when nothing but trigger phrases was said; a qualified
    /// utterance is left to later categories and the completion path.
    Bare,
}

/// Dispatch priority, first match wins.
pub const CATEGORY_ORDER: [CommandCategory; 32] = [
    CommandCategory::Help,
    CommandCategory::OpenYouTube,
    CommandCategory::OpenGoogle,
    CommandCategory::OpenLinkedIn,
    CommandCategory::OpenFacebook,
    CommandCategory::OpenInstagram,
    CommandCategory::OpenTwitter,
    CommandCategory::SearchGoogle,
    CommandCategory::SearchWikipedia,
    CommandCategory::Time,
    CommandCategory::Date,
    CommandCategory::Music,
    CommandCategory::Weather,
    CommandCategory::Joke,
    CommandCategory::DarkMode,
    CommandCategory::LightMode,
    CommandCategory::Calculate,
    CommandCategory::Timer,
    CommandCategory::Translate,
    CommandCategory::Reminder,
    CommandCategory::VolumeUp,
    CommandCategory::VolumeDown,
    CommandCategory::ListVoices,
    CommandCategory::ChangeVoice,
    CommandCategory::OpenCalculator,
    CommandCategory::OpenNotepad,
    CommandCategory::OpenSettings,
    CommandCategory::Camera,
    CommandCategory::ReadDocument,
    CommandCategory::ClearHistory,
    CommandCategory::ShowHistory,
    CommandCategory::WebSearch,
];

impl CommandCategory {
    /// Trigger phrases, lowercase.
    pub fn triggers(self) -> &'static [&'static str] {
        match self {
            Self::Help => &["ajuda", "comandos disponíveis", "help"],
            Self::OpenYouTube => &["abrir youtube", "youtube"],
            // A bare "google" would shadow "pesquisar no google".
            Self::OpenGoogle => &["abrir google"],
            Self::OpenLinkedIn => &["abrir linkedin", "linkedin"],
            Self::OpenFacebook => &["abrir facebook", "facebook"],
            Self::OpenInstagram => &["abrir instagram", "instagram"],
            Self::OpenTwitter => &["abrir twitter", "twitter"],
            Self::SearchGoogle => &["pesquisar no google", "pesquisar google"],
            Self::SearchWikipedia => &["pesquisar na wikipedia", "wikipedia"],
            Self::Time => &["que horas são", "horas", "hora"],
            Self::Date => &["que dia é hoje", "data", "dia"],
            Self::Music => &["tocar música", "música", "music"],
            Self::Weather => &["previsão do tempo", "tempo", "clima"],
            Self::Joke => &["contar piada", "piada"],
            Self::DarkMode => &["modo escuro", "dark mode"],
            Self::LightMode => &["modo claro", "light mode"],
            Self::Calculate => &["calcular", "calcule"],
            Self::Timer => &["cronômetro", "timer"],
            Self::Translate => &["traduzir", "traduza"],
            Self::Reminder => &["criar lembrete", "lembrete"],
            Self::VolumeUp => &["aumentar volume", "volume up"],
            Self::VolumeDown => &["diminuir volume", "volume down"],
            Self::ListVoices => &["listar vozes", "vozes"],
            Self::ChangeVoice => &["trocar voz", "mudar voz"],
            Self::OpenCalculator => &["abrir calculadora", "calculadora"],
            Self::OpenNotepad => &["abrir bloco de notas", "bloco de notas"],
            Self::OpenSettings => &["abrir configurações", "configurações"],
            Self::Camera => &["abrir câmera", "câmera"],
            Self::ReadDocument => &["ler documento", "reconhecer documento"],
            Self::ClearHistory => &["limpar histórico"],
            Self::ShowHistory => &["histórico", "historia"],
            Self::WebSearch => &["buscar na web", "pesquisar na web", "buscar informações"],
        }
    }

    /// How residual text is treated.
    pub fn arity(self) -> Arity {
        match self {
            Self::SearchGoogle
            | Self::SearchWikipedia
            | Self::Calculate
            | Self::Translate
            | Self::Reminder
            | Self::WebSearch => Arity::Parameter,
            Self::Weather => Arity::Bare,
            _ => Arity::Fixed,
        }
    }

    /// Stable snake_case name for logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::OpenYouTube => "open_youtube",
            Self::OpenGoogle => "open_google",
            Self::OpenLinkedIn => "open_linkedin",
            Self::OpenFacebook => "open_facebook",
            Self::OpenInstagram => "open_instagram",
            Self::OpenTwitter => "open_twitter",
            Self::SearchGoogle => "search_google",
            Self::SearchWikipedia => "search_wikipedia",
            Self::Time => "time",
            Self::Date => "date",
            Self::Music => "music",
            Self::Weather => "weather",
            Self::Joke => "joke",
            Self::DarkMode => "dark_mode",
            Self::LightMode => "light_mode",
            Self::Calculate => "calculate",
            Self::Timer => "timer",
            Self::Translate => "translate",
            Self::Reminder => "reminder",
            Self::VolumeUp => "volume_up",
            Self::VolumeDown => "volume_down",
            Self::ListVoices => "list_voices",
            Self::ChangeVoice => "change_voice",
            Self::OpenCalculator => "open_calculator",
            Self::OpenNotepad => "open_notepad",
            Self::OpenSettings => "open_settings",
            Self::Camera => "camera",
            Self::ReadDocument => "read_document",
            Self::ClearHistory => "clear_history",
            Self::ShowHistory => "show_history",
            Self::WebSearch => "web_search",
        }
    }
}

impl fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Phrases shown by the help command.
pub const HELP_PHRASES: &[&str] = &[
    "abrir youtube",
    "abrir google",
    "abrir linkedin",
    "abrir facebook",
    "abrir instagram",
    "abrir twitter",
    "pesquisar no google [termo]",
    "pesquisar na wikipedia [termo]",
    "buscar na web [termo]",
    "que horas são",
    "que dia é hoje",
    "tocar música",
    "previsão do tempo",
    "contar piada",
    "modo escuro",
    "modo claro",
    "calcular [expressão]",
    "cronômetro",
    "traduzir [texto]",
    "criar lembrete [mensagem]",
    "aumentar volume",
    "diminuir volume",
    "listar vozes",
    "trocar voz",
    "abrir calculadora",
    "abrir bloco de notas",
    "abrir configurações",
    "abrir câmera",
    "ler documento",
    "reconhecer documento",
    "histórico",
    "limpar histórico",
    "ajuda",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn order_lists_every_category_once() {
        let unique: HashSet<_> = CATEGORY_ORDER.iter().collect();
        assert_eq!(unique.len(), CATEGORY_ORDER.len());
    }

    #[test]
    fn triggers_are_lowercase_and_non_empty() {
        for category in CATEGORY_ORDER {
            assert!(!category.triggers().is_empty(), "{category}");
            for trigger in category.triggers() {
                assert_eq!(*trigger, trigger.to_lowercase(), "{category}: {trigger}");
                assert_eq!(*trigger, trigger.trim());
            }
        }
    }

    #[test]
    fn specific_history_phrase_is_declared_first() {
        let clear = CATEGORY_ORDER
            .iter()
            .position(|c| *c == CommandCategory::ClearHistory);
        let show = CATEGORY_ORDER
            .iter()
            .position(|c| *c == CommandCategory::ShowHistory);
        assert!(clear < show);
    }
}
