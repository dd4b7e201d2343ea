//! Real-Time-Need Detector.
//!
//! A coarse keyword-containment heuristic: false positives cost one
//! unnecessary lookup, false negatives skip enrichment. No negation or
//! context handling.

use cangalha_search::DomainHint;

use crate::config::HeuristicsConfig;

/// Keyword tables for live-data and domain detection.
#[derive(Debug, Clone)]
pub struct RealtimeDetector {
    realtime: Vec<String>,
    sports: Vec<String>,
    weather: Vec<String>,
}

impl Default for RealtimeDetector {
    fn default() -> Self {
        Self::new(&HeuristicsConfig::default())
    }
}

impl RealtimeDetector {
    /// Detector over the configured tables.
    pub fn new(heuristics: &HeuristicsConfig) -> Self {
        Self {
            realtime: normalize(&heuristics.realtime_keywords),
            sports: normalize(&heuristics.sports_keywords),
            weather: normalize(&heuristics.weather_keywords),
        }
    }

    /// Whether `utterance` asks for live or external data.
    ///
    /// Domain keywords count too: a weather or sports question needs live
    /// data even without a temporal marker.
    pub fn needs_live_data(&self, utterance: &str) -> bool {
        let text = utterance.to_lowercase();
        contains_any(&text, &self.realtime)
            || contains_any(&text, &self.weather)
            || contains_any(&text, &self.sports)
    }

    /// Which specialised lookup fits `utterance`. Weather wins over sports.
    pub fn domain_hint(&self, utterance: &str) -> DomainHint {
        let text = utterance.to_lowercase();
        if contains_any(&text, &self.weather) {
            DomainHint::Weather
        } else if contains_any(&text, &self.sports) {
            DomainHint::Sports
        } else {
            DomainHint::General
        }
    }
}

fn normalize(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| text.contains(n.as_str()))
}
