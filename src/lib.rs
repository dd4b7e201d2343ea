//! Cangalha: a Portuguese voice assistant core.
//!
//! Each utterance goes through one pipeline:
//! Keyword Matcher → Command Executor (on a hit), otherwise
//! Real-Time-Need Detector → Web Snippet Aggregator → Completion Request
//! Builder → completion call → Response Assertiveness Classifier.
//!
//! # Architecture
//!
//! - **Commands**: fixed trigger table, first match wins, with local
//!   side effects (URLs, clock, calculator, theme, reminders)
//! - **Realtime**: keyword heuristic deciding whether live data is needed
//! - **Web**: best-effort snippet aggregation through `cangalha-search`
//! - **Prompt**: plain, snippet-enriched or search-unavailable payloads
//! - **LLM**: OpenAI-compatible chat and vision completions via `reqwest`
//! - **Assertiveness**: hedge detection driving a delayed search fallback
//!
//! Speech, UI and camera are external collaborators behind the traits in
//! [`speech`] and [`platform`].

pub mod assertiveness;
pub mod assistant;
pub mod commands;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod platform;
pub mod prompt;
pub mod realtime;
pub mod session;
pub mod speech;
pub mod storage;
pub mod test_utils;
pub mod web;

pub use assistant::{Assistant, Collaborators, Reply, Turn};
pub use commands::{CommandCategory, CommandExecutor, KeywordMatcher, MatchResult, Outcome};
pub use config::AssistantConfig;
pub use error::{AssistantError, Result};
pub use history::{ConversationEntry, HistoryStore};
pub use session::{Origin, Session};
pub use storage::LocalStore;
