//! Bounded LRU cache of normalized lessons
//!
//! [`LruCache`] is a plain recency-ordered map. Each entry carries a recency
//! stamp; a `BTreeMap` from stamp to key keeps the least recently used entry at
//! the front. Eviction is strict LRU: one entry per overflowing insert, never
//! by size or age.
//!
//! [`LessonCache`] wraps it in a cloneable handle shared by every loader that
//! is handed the same instance. Operations lock a `std::sync::Mutex` briefly
//! and never await.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use vlp_common::LessonDocument;

/// Default maximum number of cached lessons
pub const MAX_CACHE_SIZE: usize = 50;

/// Recency-ordered cache with fixed capacity
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    entries: HashMap<K, (V, u64)>,
    recency: BTreeMap<u64, K>,
    clock: u64,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Create a cache holding at most `capacity` entries (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            clock: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a key, promoting it to most recently used on a hit
    ///
    /// A miss leaves the cache untouched.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.entries.contains_key(key) {
            return None;
        }

        self.clock += 1;
        let stamp = self.clock;
        let entry = self.entries.get_mut(key)?;
        self.recency.remove(&entry.1);
        entry.1 = stamp;
        self.recency.insert(stamp, key.clone());

        Some(&entry.0)
    }

    /// Insert or replace a value
    ///
    /// Any existing entry for the key is removed first, so the new value always
    /// lands at the most recently used end. A full cache evicts exactly one
    /// least recently used entry.
    pub fn set(&mut self, key: K, value: V) {
        if let Some((_, stamp)) = self.entries.remove(&key) {
            self.recency.remove(&stamp);
        }

        if self.entries.len() >= self.capacity {
            if let Some((_, oldest)) = self.recency.pop_first() {
                self.entries.remove(&oldest);
            }
        }

        self.clock += 1;
        self.recency.insert(self.clock, key.clone());
        self.entries.insert(key, (value, self.clock));
    }

    /// Membership test without promotion
    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }

    /// Keys from least to most recently used
    pub fn keys_by_recency(&self) -> Vec<K> {
        self.recency.values().cloned().collect()
    }
}

/// Shared handle to the lesson document cache
///
/// Clones refer to the same underlying cache.
#[derive(Debug, Clone)]
pub struct LessonCache {
    inner: Arc<Mutex<LruCache<String, Arc<LessonDocument>>>>,
}

impl LessonCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Arc<LessonDocument>>> {
        // Every operation leaves the cache consistent, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, lesson_id: &str) -> Option<Arc<LessonDocument>> {
        self.lock().get(&lesson_id.to_string()).cloned()
    }

    pub fn set(&self, lesson_id: &str, document: Arc<LessonDocument>) {
        self.lock().set(lesson_id.to_string(), document);
    }

    pub fn has(&self, lesson_id: &str) -> bool {
        self.lock().has(&lesson_id.to_string())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }
}

impl Default for LessonCache {
    fn default() -> Self {
        Self::new(MAX_CACHE_SIZE)
    }
}
