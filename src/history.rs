//! Bounded conversation history.
//!
//! Entries are kept newest first under [`HISTORY_KEY`](crate::storage::HISTORY_KEY)
//! and capped at [`MAX_HISTORY`]; inserting past the cap evicts the oldest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::storage::{HISTORY_KEY, LocalStore};

/// Maximum number of retained entries.
pub const MAX_HISTORY: usize = 100;

/// One user/assistant exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Unique, strictly increasing identifier (milliseconds since epoch,
    /// bumped when two entries land in the same millisecond).
    pub id: i64,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
    /// What the user said or typed.
    pub user: String,
    /// What the assistant answered.
    pub assistant: String,
}

/// History store over a shared [`LocalStore`].
#[derive(Debug)]
pub struct HistoryStore {
    store: Arc<LocalStore>,
    write_lock: Mutex<()>,
}

impl HistoryStore {
    /// Wrap `store`.
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Record an exchange at the head, evicting the oldest past the cap.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn add(
        &self,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Result<ConversationEntry> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.all();

        let now = Utc::now();
        let id = match entries.first() {
            Some(newest) => now.timestamp_millis().max(newest.id + 1),
            None => now.timestamp_millis(),
        };
        let entry = ConversationEntry {
            id,
            timestamp: now,
            user: user.into(),
            assistant: assistant.into(),
        };

        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY);
        self.store.save(HISTORY_KEY, &entries)?;
        Ok(entry)
    }

    /// Every entry, newest first.
    pub fn all(&self) -> Vec<ConversationEntry> {
        self.store.get(HISTORY_KEY, Vec::new())
    }

    /// The `n` most recent entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<ConversationEntry> {
        let mut entries = self.all();
        entries.truncate(n);
        entries
    }

    /// The `n` most recent entries in chronological order (oldest first).
    pub fn context_window(&self, n: usize) -> Vec<ConversationEntry> {
        let mut window = self.recent(n);
        window.reverse();
        window
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.all().len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store.remove(HISTORY_KEY)
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn remove(&self, id: i64) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries = self.all();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        if entries.len() == before {
            return Ok(false);
        }
        self.store.save(HISTORY_KEY, &entries)?;
        Ok(true)
    }

    /// Pretty-printed JSON of every entry, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.all())?)
    }
}
