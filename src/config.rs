//! Configuration types for the assistant.
//!
//! Every section is `#[serde(default)]`, so a partial TOML file only needs
//! the values it overrides.

use cangalha_search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AssistantError, Result};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Key values shipped in example configs; treated as "not configured".
const PLACEHOLDER_KEYS: &[&str] = &["YOUR_API_KEY_HERE", "SUA_CHAVE_API_AQUI"];

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Completion service settings.
    pub completion: CompletionConfig,
    /// Web snippet lookup settings.
    pub search: SearchConfig,
    /// Language-specific keyword and phrase tables.
    pub heuristics: HeuristicsConfig,
    /// Dispatch timing and context window.
    pub dispatch: DispatchConfig,
    /// Durable storage location.
    pub storage: StorageConfig,
}

/// Completion service (OpenAI-compatible) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Bearer token. Falls back to `OPENAI_API_KEY` when unset.
    pub api_key: Option<String>,
    /// Base URL without the `/v1/...` suffix.
    pub base_url: String,
    /// Model used for chat replies.
    pub model: String,
    /// Vision-capable model used for camera and document tasks.
    pub vision_model: String,
    /// Output token bound for chat and object identification.
    pub max_tokens: u32,
    /// Sampling temperature for chat and object identification.
    pub temperature: f64,
    /// Output token bound for document text extraction.
    pub ocr_max_tokens: u32,
    /// Sampling temperature for document text extraction.
    pub ocr_temperature: f64,
    /// HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com".to_owned(),
            model: "gpt-3.5-turbo".to_owned(),
            vision_model: "gpt-4o".to_owned(),
            max_tokens: 2048,
            temperature: 1.0,
            ocr_max_tokens: 4096,
            ocr_temperature: 0.1,
            timeout_secs: 60,
        }
    }
}

impl CompletionConfig {
    /// The usable API key, if any.
    ///
    /// Blank and placeholder values count as missing; the environment is
    /// consulted only when the configured key is missing.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .as_deref()
            .filter(|k| is_real_key(k))
            .map(str::to_owned)
            .or_else(|| {
                std::env::var(API_KEY_ENV)
                    .ok()
                    .filter(|k| is_real_key(k))
            })
    }
}

fn is_real_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !PLACEHOLDER_KEYS.contains(&key)
}

/// Hand-tuned Portuguese phrase tables used by the heuristics.
///
/// Replace these to run the detector and classifier against another
/// language or a synthetic test vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// Indicators that an utterance needs live data.
    pub realtime_keywords: Vec<String>,
    /// Indicators that a live query is about sports.
    pub sports_keywords: Vec<String>,
    /// Indicators that a live query is about the weather.
    pub weather_keywords: Vec<String>,
    /// Deflection phrases that make a reply non-assertive.
    pub hedge_phrases: Vec<String>,
    /// Replies shorter than this (in characters) are never assertive.
    pub min_reply_chars: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            realtime_keywords: owned(&[
                "agora",
                "hoje",
                "ao vivo",
                "atual",
                "neste momento",
                "últimas",
                "ultimas",
                "notícias",
                "noticias",
                "previsão",
                "previsao",
                "placar",
                "resultado",
                "jogo",
                "partida",
                "campeonato",
                "clima",
                "temperatura",
                "chuva",
                "cotação",
                "ontem",
                "amanhã",
                "esta semana",
                "2024",
                "2025",
                "2026",
            ]),
            sports_keywords: owned(&[
                "placar",
                "jogo",
                "partida",
                "campeonato",
                "futebol",
                "gols",
                "brasileirão",
                "libertadores",
                "copa",
                "rodada",
                "tabela",
            ]),
            weather_keywords: owned(&[
                "previsão do tempo",
                "previsao do tempo",
                "clima",
                "temperatura",
                "chuva",
                "chover",
                "graus",
                "umidade",
                "tempo em",
            ]),
            hedge_phrases: owned(&[
                "não há informação direta",
                "não há informações diretas",
                "não tenho acesso",
                "não tenho informações",
                "não possuo informações",
                "não consigo acessar",
                "não é possível fornecer",
                "recomendo pesquisar",
                "recomendo verificar",
                "recomendo consultar",
                "sugiro verificar",
                "consulte",
            ]),
            min_reply_chars: 20,
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

/// Dispatch timing and context window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Delay before a reminder fires.
    pub reminder_delay_secs: u64,
    /// Delay before the search-engine fallback opens after a vague reply.
    pub fallback_search_delay_ms: u64,
    /// Number of most recent history entries sent as context.
    pub history_window: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            reminder_delay_secs: 300,
            fallback_search_delay_ms: 2000,
            history_window: 5,
        }
    }
}

/// Durable storage location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `store.json`. `None` uses the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Directory for persisted state.
    pub fn resolved_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|d| d.join("cangalha"))
                .unwrap_or_else(|| PathBuf::from("/tmp/cangalha-data")),
        }
    }
}

impl AssistantConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| AssistantError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AssistantError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/cangalha/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("cangalha").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("cangalha")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/cangalha-config/config.toml")
        }
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.search
            .validate()
            .map_err(|e| AssistantError::Config(e.to_string()))?;
        if self.completion.base_url.trim().is_empty() {
            return Err(AssistantError::Config("completion.base_url is empty".into()));
        }
        if self.completion.max_tokens == 0 || self.completion.ocr_max_tokens == 0 {
            return Err(AssistantError::Config("max_tokens must be > 0".into()));
        }
        if !(0.0..=2.0).contains(&self.completion.temperature)
            || !(0.0..=2.0).contains(&self.completion.ocr_temperature)
        {
            return Err(AssistantError::Config(
                "temperature must be within 0.0..=2.0".into(),
            ));
        }
        Ok(())
    }
}
