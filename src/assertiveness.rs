//! Response Assertiveness Classifier.
//!
//! Decides whether a completion reply states something concrete or
//! deflects. Only used to decide on the delayed search fallback; the reply
//! itself is always shown.
//!
//! | hedge phrase | concrete figure | assertive |
//! |--------------|-----------------|-----------|
//! | any          | yes             | yes       |
//! | yes          | no              | no        |
//! | no           | no              | yes       |
//!
//! Replies shorter than the minimum length are never assertive.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::HeuristicsConfig;

static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+(?:[.,]\d+)?\s*%").expect("percent regex is valid")
});

static TEMPERATURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)-?\d+(?:[.,]\d+)?\s*[°º]\s*[cf]?|\b\d+(?:[.,]\d+)?\s*graus\b")
        .expect("temperature regex is valid")
});

static UNIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+(?:[.,]\d+)?\s*(?:km/h|m/s|mph|mm|km|kg|cm)\b")
        .expect("unit regex is valid")
});

static SCORE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}\s*[x×]\s*\d{1,2}\b").expect("score regex is valid")
});

/// Hedge-phrase and concrete-figure classifier.
#[derive(Debug, Clone)]
pub struct AssertivenessClassifier {
    hedge_phrases: Vec<String>,
    min_chars: usize,
}

impl Default for AssertivenessClassifier {
    fn default() -> Self {
        Self::new(&HeuristicsConfig::default())
    }
}

impl AssertivenessClassifier {
    /// Classifier over the configured hedge phrases and length floor.
    pub fn new(heuristics: &HeuristicsConfig) -> Self {
        Self {
            hedge_phrases: heuristics
                .hedge_phrases
                .iter()
                .map(|p| p.trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
            min_chars: heuristics.min_reply_chars,
        }
    }

    /// Whether `reply` is concrete enough to stand on its own.
    pub fn is_assertive(&self, reply: &str) -> bool {
        if reply.trim().chars().count() < self.min_chars {
            return false;
        }
        if has_concrete_data(reply) {
            return true;
        }
        !self.has_hedge(reply)
    }

    /// The first hedge phrase found in `reply`, if any.
    pub fn find_hedge(&self, reply: &str) -> Option<&str> {
        let text = reply.to_lowercase();
        self.hedge_phrases
            .iter()
            .find(|p| text.contains(p.as_str()))
            .map(String::as_str)
    }

    fn has_hedge(&self, reply: &str) -> bool {
        self.find_hedge(reply).is_some()
    }
}

/// Percentages, temperatures, measured quantities or match scores.
pub fn has_concrete_data(text: &str) -> bool {
    PERCENT_RE.is_match(text)
        || TEMPERATURE_RE.is_match(text)
        || UNIT_RE.is_match(text)
        || SCORE_RE.is_match(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_replies_are_never_assertive() {
        let c = AssertivenessClassifier::default();
        assert!(!c.is_assertive("Sim, 29%."));
        assert!(!c.is_assertive("0123456789"));
        assert!(!c.is_assertive(""));
    }

    #[test]
    fn hedge_without_data_is_not_assertive() {
        let c = AssertivenessClassifier::default();
        assert!(!c.is_assertive(
            "Não tenho acesso a dados em tempo real. Recomendo pesquisar em um site de notícias."
        ));
        assert!(!c.is_assertive("Para saber o resultado exato, consulte o site oficial."));
    }

    #[test]
    fn concrete_figure_overrides_hedge() {
        let c = AssertivenessClassifier::default();
        assert!(c.is_assertive(
            "A umidade em São Paulo está em 29%. Consulte o INMET para detalhes."
        ));
        assert!(c.is_assertive(
            "Faz 31°C agora no Rio, mas recomendo verificar a previsão oficial."
        ));
        assert!(c.is_assertive("Ventos de 40 km/h, não tenho acesso a mais dados."));
        assert!(c.is_assertive("O Palmeiras venceu por 2 x 1, consulte os melhores momentos."));
    }

    #[test]
    fn plain_answers_are_assertive() {
        let c = AssertivenessClassifier::default();
        assert!(c.is_assertive("Machado de Assis escreveu Dom Casmurro em 1899."));
    }

    #[test]
    fn hedge_matching_is_case_insensitive() {
        let c = AssertivenessClassifier::default();
        assert_eq!(
            c.find_hedge("NÃO TENHO ACESSO à internet"),
            Some("não tenho acesso")
        );
    }

    #[test]
    fn custom_tables() {
        let heuristics = HeuristicsConfig {
            hedge_phrases: vec!["I cannot".into()],
            min_reply_chars: 5,
            ..Default::default()
        };
        let c = AssertivenessClassifier::new(&heuristics);
        assert!(!c.is_assertive("I cannot browse the web"));
        assert!(c.is_assertive("Consulte o site"));
    }

    #[test]
    fn concrete_patterns() {
        assert!(has_concrete_data("12,5 %"));
        assert!(has_concrete_data("-3 ºC"));
        assert!(has_concrete_data("máxima de 25 graus"));
        assert!(has_concrete_data("chuva de 12 mm"));
        assert!(!has_concrete_data("nenhum número aqui"));
        assert!(!has_concrete_data("ano de 1899"));
    }
}
