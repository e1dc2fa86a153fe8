//! LRU cache for check decisions

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

use crate::config::DEFAULT_CACHE_CAPACITY;

/// Decision cache keyed by the raw query pattern
///
/// A token's grant tree only grows, so a cached `false` may become stale after
/// the next grant. Owners must call [`DecisionCache::clear`] whenever the tree
/// changes.
pub struct DecisionCache {
    cache: Mutex<LruCache<String, bool>>,
}

impl DecisionCache {
    /// Create a cache with the given capacity (a zero capacity falls back to the default)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or_else(|| NonZeroUsize::new(DEFAULT_CACHE_CAPACITY))
            .unwrap_or(NonZeroUsize::MIN);

        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Get a cached decision
    pub fn get(&self, pattern: &str) -> Option<bool> {
        self.cache.lock().get(pattern).copied()
    }

    /// Store a decision
    pub fn put(&self, pattern: &str, allowed: bool) {
        self.cache.lock().put(pattern.to_string(), allowed);
    }

    /// Drop every cached decision
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Number of cached decisions
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for DecisionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionCache")
            .field("len", &self.len())
            .finish()
    }
}
