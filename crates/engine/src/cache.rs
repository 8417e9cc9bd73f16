//! Result cache seam and in-memory implementation
//!
//! The cache is a pure performance layer: search correctness must hold with
//! caching disabled or failing, so every operation is fallible and the
//! lifecycle manager swallows (and logs) all cache errors.
//!
//! Entries carry a TTL and a tag list; refresh invalidates by tag rather
//! than enumerating keys.

use dashmap::DashMap;
use muster_core::Result;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Key-value cache with TTL expiry and tag-based invalidation
pub trait ResultCache: Send + Sync {
    /// Fetch a live entry, `None` on miss or expiry
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store an entry under the given TTL and tags
    fn set(&self, key: &str, value: &str, ttl: Duration, tags: &[&str]) -> Result<()>;

    /// Drop every entry carrying any of the given tags
    fn invalidate_by_tags(&self, tags: &[&str]) -> Result<()>;
}

#[derive(Debug)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
    tags: Vec<String>,
}

/// Cache hit/miss counters for monitoring and tuning
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Total live-entry hits
    pub hits: u64,
    /// Total misses (absent or expired)
    pub misses: u64,
    /// Entries currently held (including not-yet-collected expired ones)
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Thread-safe in-memory cache
///
/// Expired entries are collected lazily on read; `invalidate_by_tags` scans
/// the whole map, which is fine at search-result cardinalities.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, CacheEntry>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        MemoryCache::default()
    }

    /// Counter snapshot
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries.remove(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration, tags: &[&str]) -> Result<()> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
                tags: tags.iter().map(|t| t.to_string()).collect(),
            },
        );
        Ok(())
    }

    fn invalidate_by_tags(&self, tags: &[&str]) -> Result<()> {
        self.entries
            .retain(|_, entry| !entry.tags.iter().any(|t| tags.contains(&t.as_str())));
        Ok(())
    }
}
