//! Client-side storage abstraction
//!
//! The portal keeps its session token and profile snapshot on the client.
//! Handlers never touch the storage mechanism directly: they receive a
//! [`SessionStorage`] and address values by scope and key, so the same
//! session logic runs against cookies in production and against
//! [`MemoryStorage`] in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Where a stored value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Survives browser restarts until explicitly cleared
    Persistent,
    /// Lives as long as the tab/browser session
    Tab,
}

impl StorageScope {
    /// Every scope, in lookup order
    pub const ALL: [StorageScope; 2] = [StorageScope::Persistent, StorageScope::Tab];

    /// Short name used to namespace keys
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageScope::Persistent => "persist",
            StorageScope::Tab => "tab",
        }
    }
}

/// Get/set/remove capability over scoped string values
pub trait SessionStorage {
    fn get(&self, scope: StorageScope, key: &str) -> Option<String>;

    fn set(&self, scope: StorageScope, key: &str, value: &str);

    fn remove(&self, scope: StorageScope, key: &str);

    /// Remove `key` from every scope
    fn remove_everywhere(&self, key: &str) {
        for scope in StorageScope::ALL {
            self.remove(scope, key);
        }
    }
}

/// In-process storage, shared between clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<(StorageScope, String), String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values across all scopes
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, scope: StorageScope, key: &str) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        entries.get(&(scope, key.to_string())).cloned()
    }

    fn set(&self, scope: StorageScope, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((scope, key.to_string()), value.to_string());
        }
    }

    fn remove(&self, scope: StorageScope, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&(scope, key.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_are_independent() {
        let storage = MemoryStorage::new();
        storage.set(StorageScope::Persistent, "token", "a");
        storage.set(StorageScope::Tab, "token", "b");

        assert_eq!(storage.get(StorageScope::Persistent, "token").as_deref(), Some("a"));
        assert_eq!(storage.get(StorageScope::Tab, "token").as_deref(), Some("b"));

        storage.remove(StorageScope::Tab, "token");
        assert_eq!(storage.get(StorageScope::Tab, "token"), None);
        assert_eq!(storage.get(StorageScope::Persistent, "token").as_deref(), Some("a"));
    }

    #[test]
    fn test_remove_everywhere() {
        let storage = MemoryStorage::new();
        storage.set(StorageScope::Persistent, "user", "{}");
        storage.set(StorageScope::Tab, "user", "{}");
        storage.set(StorageScope::Tab, "other", "x");

        storage.remove_everywhere("user");

        assert_eq!(storage.len(), 1);
        assert_eq!(storage.get(StorageScope::Tab, "other").as_deref(), Some("x"));
    }

    #[test]
    fn test_clones_share_entries() {
        let storage = MemoryStorage::new();
        let view = storage.clone();
        storage.set(StorageScope::Tab, "k", "v");
        assert_eq!(view.get(StorageScope::Tab, "k").as_deref(), Some("v"));
    }
}
