//! Route resolution caching
//!
//! Remembers which configured pattern (if any) a hash path resolved to, so
//! repeated lookups for the same location skip pattern matching. LRU eviction.

use crate::trace_log;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Cache performance statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: usize,
    /// Lookups that had to run the matcher
    pub misses: usize,
    /// Number of times the cache was cleared
    pub invalidations: usize,
}

impl CacheStats {
    /// Fraction of lookups that were hits, `0.0` before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Path -> matched pattern index cache
///
/// Default capacity: 256 paths. A cached `None` records a path that matched
/// no pattern.
#[derive(Debug)]
pub struct RouteCache {
    resolved: LruCache<String, Option<usize>>,
    stats: CacheStats,
}

impl RouteCache {
    const DEFAULT_CAPACITY: usize = 256;

    /// Cache with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Cache holding up to `capacity` paths.
    ///
    /// A capacity of zero is bumped to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            resolved: LruCache::new(cap),
            stats: CacheStats::default(),
        }
    }

    /// Cached resolution for `path`; the outer `None` means "not cached"
    pub fn get(&mut self, path: &str) -> Option<Option<usize>> {
        if let Some(resolved) = self.resolved.get(path) {
            self.stats.hits += 1;
            trace_log!("Route cache hit for path: '{}'", path);
            Some(*resolved)
        } else {
            self.stats.misses += 1;
            trace_log!("Route cache miss for path: '{}'", path);
            None
        }
    }

    /// Remember the resolution of `path`, evicting the least recently used
    /// path when full
    pub fn insert(&mut self, path: String, resolved: Option<usize>) {
        self.resolved.push(path, resolved);
    }

    /// Forget every path and count an invalidation
    pub fn clear(&mut self) {
        trace_log!("Clearing route cache");
        self.resolved.clear();
        self.stats.invalidations += 1;
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of cached paths
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Check if nothing is cached
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_miss_then_hit() {
        let mut cache = RouteCache::new();
        assert_eq!(cache.get("users/1"), None);

        cache.insert("users/1".to_string(), Some(2));
        cache.insert("nowhere".to_string(), None);

        assert_eq!(cache.get("users/1"), Some(Some(2)));
        assert_eq!(cache.get("nowhere"), Some(None));
        assert_eq!(cache.stats().hits, 2);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = RouteCache::with_capacity(2);
        cache.insert("a".to_string(), Some(0));
        cache.insert("b".to_string(), Some(1));
        cache.get("a");
        cache.insert("c".to_string(), Some(2));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("a"), Some(Some(0)));
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = RouteCache::with_capacity(0);
        cache.insert("a".to_string(), Some(0));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn test_hit_rate_calculation() {
        let mut cache = RouteCache::new();
        cache.get("/a");
        cache.get("/b");
        cache.get("/c");

        cache.insert("/a".to_string(), Some(0));
        cache.insert("/b".to_string(), None);

        cache.get("/a");
        cache.get("/b");

        assert!((cache.stats().hit_rate() - 0.4).abs() < 0.001);
    }
}
