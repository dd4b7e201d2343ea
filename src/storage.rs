//! Durable key/value store.
//!
//! Values are kept as JSON strings under string keys, either in memory or
//! mirrored to a single `store.json` file. Reads never fail: a missing or
//! corrupt value yields the caller's default.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{AssistantError, Result};

/// Key holding the conversation history list.
pub const HISTORY_KEY: &str = "cangalha_history";
/// Key holding the speak preference.
pub const SETTINGS_KEY: &str = "cangalha_settings";
/// Key holding the theme name.
pub const THEME_KEY: &str = "cangalha_theme";

/// File name used inside the data directory.
pub const STORE_FILE: &str = "store.json";

/// Key → JSON-string map with optional file persistence.
#[derive(Debug, Default)]
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl LocalStore {
    /// A store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or create) the store file inside `dir`.
    ///
    /// An unreadable or corrupt file starts the store empty; it is
    /// overwritten on the next write.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` cannot be created.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(STORE_FILE);
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read and decode `key`, falling back to `default`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|e| {
                tracing::warn!(key, error = %e, "undecodable stored value");
                default
            }),
            None => default,
        }
    }

    /// Encode and store `value` under `key`.
    ///
    /// The in-memory value changes only once the file write succeeded.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded or the file written.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut next = entries.clone();
        next.insert(key.to_owned(), raw);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next)?;
        *entries = next;
        Ok(())
    }

    /// Whether `key` holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(key)
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string_pretty(entries)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, path)
            .map_err(|e| AssistantError::Storage(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn missing_key_returns_default() {
        let store = LocalStore::in_memory();
        assert!(store.get(SETTINGS_KEY, true));
        assert_eq!(store.get::<Vec<u32>>(HISTORY_KEY, Vec::new()), Vec::<u32>::new());
    }

    #[test]
    fn values_are_json_strings() {
        let store = LocalStore::in_memory();
        store.save(THEME_KEY, "dark").expect("save");
        let raw = store.entries.lock().unwrap().get(THEME_KEY).cloned();
        assert_eq!(raw.as_deref(), Some("\"dark\""));
        assert_eq!(store.get(THEME_KEY, String::new()), "dark");
    }

    #[test]
    fn undecodable_value_falls_back() {
        let store = LocalStore::in_memory();
        store.save(SETTINGS_KEY, "not a bool").expect("save");
        assert!(store.get(SETTINGS_KEY, true));
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = LocalStore::open(dir.path()).expect("open");
            store.save(SETTINGS_KEY, &false).expect("save");
            store.save(THEME_KEY, "light").expect("save");
            store.remove(THEME_KEY).expect("remove");
        }
        let reopened = LocalStore::open(dir.path()).expect("reopen");
        assert!(!reopened.get(SETTINGS_KEY, true));
        assert!(!reopened.contains(THEME_KEY));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(STORE_FILE), "{{{").expect("write");
        let store = LocalStore::open(dir.path()).expect("open");
        assert!(!store.contains(HISTORY_KEY));
        store.save(HISTORY_KEY, &Vec::<u8>::new()).expect("overwrite");
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let data_dir = dir.path().join("data");
        let store = LocalStore::open(&data_dir).expect("open");
        store.save(THEME_KEY, "light").expect("save");
        std::fs::remove_dir_all(&data_dir).expect("remove data dir");

        assert!(store.save(THEME_KEY, "dark").is_err());
        assert_eq!(store.get(THEME_KEY, String::new()), "light");
        assert!(store.remove(THEME_KEY).is_err());
        assert!(store.contains(THEME_KEY));
    }
}
