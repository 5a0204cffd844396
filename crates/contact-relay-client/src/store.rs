//! Local key-value store: the browser-localStorage equivalent.
//!
//! A single JSON object file, keys namespaced under the app prefix. Reads
//! come from an in-memory map loaded at open; every mutation rewrites the
//! file. Unreadable files start empty rather than failing the app.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde_json::Value;
use tracing::warn;

pub struct LocalStore {
    path: PathBuf,
    prefix: String,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl LocalStore {
    /// Open (or create) the store at `path`, namespacing keys with `prefix`.
    #[must_use]
    pub fn open(path: PathBuf, prefix: String) -> Self {
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default();
        Self {
            path,
            prefix,
            entries: Mutex::new(entries),
        }
    }

    /// Read a value. `None` when absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&self.prefixed(key))
            .cloned()
    }

    /// Typed read via serde. `None` when absent or the stored shape differs.
    #[must_use]
    pub fn get_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    /// Write a value and persist.
    pub fn set(&self, key: &str, value: Value) {
        let mut guard = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.insert(self.prefixed(key), value);
        self.persist(&guard);
    }

    /// Remove a key and persist. Removing an absent key is fine.
    pub fn remove(&self, key: &str) {
        let mut guard = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if guard.remove(&self.prefixed(key)).is_some() {
            self.persist(&guard);
        }
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{key}", self.prefix)
    }

    /// Storage is a cache of convenience state; failing to persist must not
    /// take the app down, so errors are logged and swallowed.
    fn persist(&self, entries: &BTreeMap<String, Value>) {
        let result = serde_json::to_string_pretty(entries)
            .map_err(std::io::Error::other)
            .and_then(|json| {
                if let Some(parent) = self.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                fs::write(&self.path, json)
            });
        if let Err(err) = result {
            warn!(error = %err, path = %self.path.display(), "local store persist failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_store(dir: &std::path::Path) -> LocalStore {
        LocalStore::open(dir.join("store.json"), "cr_".to_string())
    }

    #[test]
    fn set_get_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        assert!(store.get("draft").is_none());

        store.set("draft", serde_json::json!({"name": "Jane"}));
        assert_eq!(store.get("draft").unwrap()["name"], "Jane");

        store.remove("draft");
        assert!(store.get("draft").is_none());
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = open_store(dir.path());
            store.set("submissions", serde_json::json!([1, 2, 3]));
        }
        let reopened = open_store(dir.path());
        let entries: Vec<i64> = reopened.get_as("submissions").unwrap();
        assert_eq!(entries, vec![1, 2, 3]);
    }

    #[test]
    fn keys_are_namespaced_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        store.set("draft", Value::Bool(true));

        let raw = fs::read_to_string(dir.path().join("store.json")).unwrap();
        let parsed: BTreeMap<String, Value> = serde_json::from_str(&raw).unwrap();
        assert!(parsed.contains_key("cr_draft"));
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("store.json"), "not json at all").unwrap();
        let store = open_store(dir.path());
        assert!(store.get("anything").is_none());
        // And the store is still writable afterwards.
        store.set("anything", Value::from(1));
        assert_eq!(store.get("anything"), Some(Value::from(1)));
    }

    #[test]
    fn typed_read_with_wrong_shape_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path());
        store.set("submissions", Value::String("oops".to_string()));
        assert!(store.get_as::<Vec<i64>>("submissions").is_none());
    }
}
