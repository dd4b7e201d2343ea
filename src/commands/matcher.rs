//! Keyword Matcher.
//!
//! Multi-word triggers match by containment. Single-word triggers match only
//! as a whitespace-delimited token, so short generic words ("dia", "tempo")
//! do not fire inside unrelated words. Categories are tried in declared
//! order and the first satisfied one wins; there is no scoring.

use regex::{Regex, RegexBuilder};
use std::sync::LazyLock;

use super::{Arity, CATEGORY_ORDER, CommandCategory};

static BUILT_IN: LazyLock<KeywordMatcher> = LazyLock::new(|| {
    KeywordMatcher::from_table(CATEGORY_ORDER.iter().map(|category| {
        let triggers = category.triggers().iter().map(|t| (*t).to_owned()).collect();
        (*category, triggers, category.arity())
    }))
    .expect("built-in trigger regex is valid")
});

/// Outcome of matching one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchResult {
    /// The winning category, if any.
    pub category: Option<CommandCategory>,
    /// Free-text argument with trigger phrases removed, original casing.
    pub parameter: Option<String>,
}

impl MatchResult {
    /// Whether a category matched.
    pub fn is_match(&self) -> bool {
        self.category.is_some()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    category: CommandCategory,
    triggers: Vec<String>,
    arity: Arity,
    strip: Regex,
}

/// Ordered (trigger set, category) dispatch table.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    entries: Vec<Entry>,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordMatcher {
    /// Matcher over the built-in Portuguese command table.
    pub fn new() -> Self {
        BUILT_IN.clone()
    }

    /// Matcher over a custom table, tried in iteration order.
    ///
    /// Triggers are lowercased; blank triggers are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the trigger-stripping pattern cannot be compiled
    /// (for example when it exceeds the regex size limit).
    pub fn from_table<I>(table: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = (CommandCategory, Vec<String>, Arity)>,
    {
        let mut entries = Vec::new();
        for (category, triggers, arity) in table {
            let mut triggers: Vec<String> = triggers
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect();
            if triggers.is_empty() {
                continue;
            }
            triggers.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
            triggers.dedup();

            let alternation = triggers
                .iter()
                .map(|t| strip_pattern(t))
                .collect::<Vec<_>>()
                .join("|");
            let strip = RegexBuilder::new(&alternation)
                .case_insensitive(true)
                .build()?;

            entries.push(Entry {
                category,
                triggers,
                arity,
                strip,
            });
        }
        Ok(Self { entries })
    }

    /// Match `message` against the table.
    pub fn match_utterance(&self, message: &str) -> MatchResult {
        let original = message.trim();
        let lower = original.to_lowercase();
        if lower.is_empty() {
            return MatchResult::default();
        }

        for entry in &self.entries {
            if !entry.triggers.iter().any(|t| trigger_matches(&lower, t)) {
                continue;
            }
            match entry.arity {
                Arity::Fixed => {
                    return MatchResult {
                        category: Some(entry.category),
                        parameter: None,
                    };
                }
                Arity::Parameter => {
                    let residual = entry.residual(original);
                    if residual.is_empty() {
                        tracing::trace!(category = %entry.category, "empty parameter, continuing");
                        continue;
                    }
                    return MatchResult {
                        category: Some(entry.category),
                        parameter: Some(residual),
                    };
                }
                Arity::Bare => {
                    if entry.residual(original).is_empty() {
                        return MatchResult {
                            category: Some(entry.category),
                            parameter: None,
                        };
                    }
                    tracing::trace!(category = %entry.category, "qualified utterance, continuing");
                }
            }
        }
        MatchResult::default()
    }
}

impl Entry {
    fn residual(&self, original: &str) -> String {
        let stripped = self.strip.replace_all(original, " ");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Pattern removing `trigger` from an utterance. Single words are removed
/// only as whole words, mirroring [`trigger_matches`].
fn strip_pattern(trigger: &str) -> String {
    let escaped = regex::escape(trigger);
    if trigger.contains(char::is_whitespace) {
        return escaped;
    }
    let starts = trigger.starts_with(char::is_alphanumeric);
    let ends = trigger.ends_with(char::is_alphanumeric);
    format!(
        "{}{escaped}{}",
        if starts { r"\b" } else { "" },
        if ends { r"\b" } else { "" }
    )
}

/// Whether lowercase `trigger` fires on lowercase `utterance`.
pub fn trigger_matches(utterance: &str, trigger: &str) -> bool {
    if trigger.contains(char::is_whitespace) {
        utterance.contains(trigger)
    } else {
        utterance.split_whitespace().any(|token| token == trigger)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn category(message: &str) -> Option<CommandCategory> {
        KeywordMatcher::new().match_utterance(message).category
    }

    #[test]
    fn single_word_needs_whole_token() {
        assert!(trigger_matches("dia", "dia"));
        assert!(trigger_matches("dia de sol", "dia"));
        assert!(trigger_matches("que lindo dia", "dia"));
        assert!(trigger_matches("um dia bonito", "dia"));
        assert!(!trigger_matches("sandia", "dia"));
        assert!(!trigger_matches("comprei uma sandia", "dia"));
        assert!(!trigger_matches("diario", "dia"));
    }

    #[test]
    fn multi_word_matches_anywhere() {
        assert!(trigger_matches("por favor abrir youtube agora", "abrir youtube"));
        assert!(trigger_matches("xabrir youtubex", "abrir youtube"));
    }

    #[test]
    fn every_built_in_single_word_trigger_respects_tokens() {
        let matcher = KeywordMatcher::new();
        for cat in CATEGORY_ORDER {
            for trigger in cat.triggers() {
                if trigger.contains(' ') {
                    continue;
                }
                let glued = format!("x{trigger}x");
                let hit = matcher.match_utterance(&glued);
                assert_ne!(hit.category, Some(cat), "{trigger} fired inside {glued}");
            }
        }
    }

    #[test]
    fn open_site_commands() {
        assert_eq!(category("abrir youtube"), Some(CommandCategory::OpenYouTube));
        assert_eq!(category("Abrir Google"), Some(CommandCategory::OpenGoogle));
        assert_eq!(category("  instagram "), Some(CommandCategory::OpenInstagram));
    }

    #[test]
    fn earlier_category_wins_on_overlap() {
        // "ajuda" (Help) and "youtube" (OpenYouTube) both present.
        assert_eq!(category("ajuda com youtube"), Some(CommandCategory::Help));
        // "que horas são" (Time) beats "dia" (Date).
        assert_eq!(category("que horas são neste dia"), Some(CommandCategory::Time));
        // Repeated runs resolve identically.
        for _ in 0..10 {
            assert_eq!(category("ajuda com youtube"), Some(CommandCategory::Help));
        }
    }

    #[test]
    fn google_search_is_reachable() {
        let result = KeywordMatcher::new().match_utterance("Pesquisar no Google Rust Lang");
        assert_eq!(result.category, Some(CommandCategory::SearchGoogle));
        assert_eq!(result.parameter.as_deref(), Some("Rust Lang"));
    }

    #[test]
    fn parameter_keeps_original_casing() {
        let result = KeywordMatcher::new().match_utterance("Traduzir Good Morning Everyone");
        assert_eq!(result.category, Some(CommandCategory::Translate));
        assert_eq!(result.parameter.as_deref(), Some("Good Morning Everyone"));
    }

    #[test]
    fn longest_trigger_is_stripped_first() {
        let result = KeywordMatcher::new().match_utterance("criar lembrete comprar pão");
        assert_eq!(result.category, Some(CommandCategory::Reminder));
        assert_eq!(result.parameter.as_deref(), Some("comprar pão"));
    }

    #[test]
    fn single_word_trigger_is_not_stripped_inside_words() {
        let result = KeywordMatcher::new().match_utterance("criar lembrete lembretes antigos");
        assert_eq!(result.category, Some(CommandCategory::Reminder));
        assert_eq!(result.parameter.as_deref(), Some("lembretes antigos"));

        let result = KeywordMatcher::new().match_utterance("traduzir retraduzir");
        assert_eq!(result.category, Some(CommandCategory::Translate));
        assert_eq!(result.parameter.as_deref(), Some("retraduzir"));
    }

    #[test]
    fn empty_parameter_falls_through() {
        // Bare "calcular" has nothing to evaluate.
        assert!(!KeywordMatcher::new().match_utterance("calcular").is_match());
        // Bare "wikipedia" continues and matches nothing else.
        assert!(!KeywordMatcher::new().match_utterance("wikipedia").is_match());
    }

    #[test]
    fn calculation_parameter() {
        let result = KeywordMatcher::new().match_utterance("calcular 2 mais 2");
        assert_eq!(result.category, Some(CommandCategory::Calculate));
        assert_eq!(result.parameter.as_deref(), Some("2 mais 2"));
    }

    #[test]
    fn weather_command_only_when_bare() {
        assert_eq!(category("previsão do tempo"), Some(CommandCategory::Weather));
        assert_eq!(category("clima"), Some(CommandCategory::Weather));
        assert_eq!(category("qual a previsão do tempo em São Paulo"), None);
    }

    #[test]
    fn clear_history_beats_show_history() {
        assert_eq!(category("limpar histórico"), Some(CommandCategory::ClearHistory));
        assert_eq!(category("mostrar histórico"), Some(CommandCategory::ShowHistory));
    }

    #[test]
    fn generic_words_do_not_fire_inside_words() {
        assert_eq!(category("bom diagnóstico"), None);
        assert_eq!(category("contratempo"), None);
    }

    #[test]
    fn empty_and_unknown_utterances() {
        assert!(!KeywordMatcher::new().match_utterance("").is_match());
        assert!(!KeywordMatcher::new().match_utterance("   ").is_match());
        assert!(!KeywordMatcher::new()
            .match_utterance("quem ganhou a copa de 1970")
            .is_match());
    }

    #[test]
    fn custom_table_uses_given_order() {
        let matcher = KeywordMatcher::from_table([
            (
                CommandCategory::Translate,
                vec!["Alfa Beta".to_owned()],
                Arity::Parameter,
            ),
            (CommandCategory::Joke, vec!["beta".to_owned()], Arity::Fixed),
        ])
        .expect("table");

        let hit = matcher.match_utterance("alfa beta Gama");
        assert_eq!(hit.category, Some(CommandCategory::Translate));
        assert_eq!(hit.parameter.as_deref(), Some("Gama"));

        // Empty residual falls through to the next category.
        assert_eq!(
            matcher.match_utterance("alfa beta").category,
            Some(CommandCategory::Joke)
        );
    }
}
