//! Bounded cache of per-connection streaming adapters

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::{Arc, Mutex};

/// Default number of adapters kept alive
pub const DEFAULT_CACHE_LIMIT: usize = 100;

struct Inner<K, V> {
    entries: HashMap<K, Arc<V>>,
    /// Keys in insertion order, oldest first
    order: VecDeque<K>,
}

/// Insertion-ordered bounded map
///
/// When full, inserting a new key evicts the oldest inserted one. Hits do
/// not move an entry, so this is FIFO rather than LRU.
pub struct AdapterCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    capacity: usize,
}

impl<K, V> AdapterCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` adapters (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
            }),
            capacity,
        }
    }

    /// Return the adapter for `key`, building it with `factory` on a miss
    ///
    /// The factory runs under the cache lock: concurrent misses on the same
    /// key build exactly one adapter. Factories must therefore be cheap and
    /// must not block.
    pub fn get_or_insert_with<F>(&self, key: K, factory: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = inner.entries.get(&key) {
            return Arc::clone(existing);
        }

        while inner.entries.len() >= self.capacity {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&oldest);
            tracing::debug!("Evicted oldest adapter from cache");
        }

        let adapter = Arc::new(factory());
        inner.entries.insert(key.clone(), Arc::clone(&adapter));
        inner.order.push_back(key);
        adapter
    }

    /// Look up an adapter without inserting
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> Default for AdapterCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_LIMIT)
    }
}
