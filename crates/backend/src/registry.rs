//! Short-lived cache of values resolved from the backend
//!
//! Used to remember file metadata and download paths so that consecutive
//! range requests for the same file do not each cost a Bot API round trip.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    created_at: DateTime<Utc>,
}

/// Thread-safe map whose entries expire after a fixed age
#[derive(Clone)]
pub struct Registry<K, V> {
    entries: Arc<RwLock<HashMap<K, Entry<V>>>>,
    max_age: Duration,
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a registry whose entries are valid for `max_age`
    pub fn new(max_age: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            max_age,
        }
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn register(&self, key: K, value: V) {
        self.register_at(key, value, Utc::now());
    }

    fn register_at(&self, key: K, value: V, created_at: DateTime<Utc>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, Entry { value, created_at });
    }

    /// Get the value for `key` if present and not expired
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).and_then(|entry| {
            let age = Utc::now().signed_duration_since(entry.created_at);
            if age < self.max_age {
                Some(entry.value.clone())
            } else {
                tracing::debug!("Registry entry expired: {}s old", age.num_seconds());
                None
            }
        })
    }

    pub fn remove(&self, key: &K) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired entries
    ///
    /// # Returns
    /// * Number of entries removed
    pub fn cleanup(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();
        let initial_count = entries.len();

        entries.retain(|_, entry| now.signed_duration_since(entry.created_at) < self.max_age);

        initial_count - entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry<i32, String> {
        Registry::new(Duration::hours(1))
    }

    #[test]
    fn test_register_and_get() {
        let registry = registry();
        registry.register(7, "video.mp4".to_string());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&7).as_deref(), Some("video.mp4"));
        assert!(registry.get(&8).is_none());

        registry.remove(&7);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_overwrite_entry() {
        let registry = registry();
        registry.register(1, "first".to_string());
        registry.register(1, "second".to_string());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&1).as_deref(), Some("second"));
    }

    #[test]
    fn test_expired_entry_is_hidden() {
        let registry = registry();
        registry.register_at(1, "old".to_string(), Utc::now() - Duration::hours(2));

        assert!(registry.get(&1).is_none());
        // still stored until cleanup runs
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let registry = registry();
        registry.register(1, "fresh".to_string());
        registry.register_at(2, "old".to_string(), Utc::now() - Duration::hours(2));

        assert_eq!(registry.cleanup(), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&1).is_some());
        assert!(registry.get(&2).is_none());

        assert_eq!(registry.cleanup(), 0);
    }

    #[test]
    fn test_clones_share_entries() {
        let registry = registry();
        let other = registry.clone();
        other.register(3, "shared".to_string());
        assert_eq!(registry.get(&3).as_deref(), Some("shared"));
    }
}
