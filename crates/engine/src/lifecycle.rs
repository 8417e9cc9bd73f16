//! Index lifecycle manager
//!
//! Owns the active index snapshot and drives its replacement: loaders run
//! concurrently, their output is assembled into a fresh `IndexSnapshot`, and
//! the new snapshot is published by a single atomic pointer swap. Queries
//! clone the current `Arc` and never observe a partially built index;
//! builds never block reads.
//!
//! Build policy: any loader failure or timeout aborts the whole build and
//! leaves the previously published snapshot untouched. A stale-but-complete
//! index beats one silently missing an entire entity type.
//!
//! First-build policy: queries issued before the first successful build are
//! rejected with `IndexNotReady` (retryable) rather than blocked, keeping
//! the no-query-blocks-query guarantee unconditional.

use crate::cache::ResultCache;
use crate::loader::EntityLoader;
use chrono::{DateTime, Utc};
use muster_core::{Error, Result, SearchQuery, SearchResult, SearchableEntity};
use muster_search::IndexSnapshot;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Tag attached to every cached search result; refresh invalidates it
pub const SEARCH_CACHE_TAG: &str = "search";

// ============================================================================
// EngineConfig
// ============================================================================

/// Tunables for the lifecycle manager
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// A loader exceeding this is treated as failed, not as partial success
    pub loader_timeout: Duration,

    /// TTL for memoized search results
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            loader_timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

impl EngineConfig {
    /// Builder: set the per-loader timeout
    pub fn with_loader_timeout(mut self, timeout: Duration) -> Self {
        self.loader_timeout = timeout;
        self
    }

    /// Builder: set the cached-result TTL
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

// ============================================================================
// IndexState / IndexStats
// ============================================================================

/// Lifecycle state, derived from whether a snapshot has been published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// No snapshot published yet; queries are rejected with `IndexNotReady`
    Building,
    /// A snapshot is live; rebuilds happen behind it
    Ready,
}

/// Observability snapshot of the published index
#[derive(Debug, Clone)]
pub struct IndexStats {
    /// Indexed documents
    pub documents: usize,
    /// Distinct indexed terms
    pub terms: usize,
    /// Distinct (facet, value) pairs
    pub facets: usize,
    /// Completion time of the last successful build
    pub last_build_at: Option<DateTime<Utc>>,
    /// Successful builds since construction
    pub builds_completed: u64,
}

// ============================================================================
// IndexManager
// ============================================================================

/// Owns the active snapshot and coordinates builds, queries, and the cache
///
/// Explicitly constructed and dependency-injected; the hosting application
/// drives the lifecycle (first build, refreshes, shutdown of the periodic
/// scheduler) rather than relying on process-global state.
pub struct IndexManager {
    loaders: Vec<Arc<dyn EntityLoader>>,
    snapshot: RwLock<Option<Arc<IndexSnapshot>>>,
    cache: Option<Arc<dyn ResultCache>>,
    config: EngineConfig,
    builds_completed: AtomicU64,
    // Serializes builds; never held while serving queries
    build_lock: Mutex<()>,
}

impl IndexManager {
    /// Create a manager over the given loaders; no snapshot is built yet
    pub fn new(loaders: Vec<Arc<dyn EntityLoader>>) -> Self {
        IndexManager {
            loaders,
            snapshot: RwLock::new(None),
            cache: None,
            config: EngineConfig::default(),
            builds_completed: AtomicU64::new(0),
            build_lock: Mutex::new(()),
        }
    }

    /// Builder: memoize results through the given cache
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Builder: override the default configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> IndexState {
        if self.snapshot.read().is_some() {
            IndexState::Ready
        } else {
            IndexState::Building
        }
    }

    /// True once the first build has published a snapshot
    pub fn is_ready(&self) -> bool {
        self.state() == IndexState::Ready
    }

    /// Clone the currently published snapshot reference, if any
    pub fn current_snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        self.snapshot.read().clone()
    }

    // ========================================================================
    // Build / refresh
    // ========================================================================

    /// Run every loader, assemble a fresh snapshot, and publish it atomically
    ///
    /// The previously published snapshot keeps serving queries for the whole
    /// duration; on any failure it stays published and the error propagates.
    pub fn build_index(&self) -> Result<()> {
        let _build_guard = self.build_lock.lock();
        let started = Instant::now();
        debug!(loaders = self.loaders.len(), "index build started");

        let documents = self.load_all()?;
        let snapshot = Arc::new(IndexSnapshot::build(documents));
        let (documents, terms) = (snapshot.len(), snapshot.word_index().term_count());

        *self.snapshot.write() = Some(snapshot);
        self.builds_completed.fetch_add(1, Ordering::Relaxed);

        info!(
            documents,
            terms,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index build complete"
        );
        Ok(())
    }

    /// Rebuild, then drop every cached search result
    pub fn refresh(&self) -> Result<()> {
        self.build_index()?;
        if let Some(cache) = &self.cache {
            if let Err(err) = cache.invalidate_by_tags(&[SEARCH_CACHE_TAG]) {
                warn!(error = %err, "search cache invalidation failed");
            }
        }
        Ok(())
    }

    /// Run all loaders concurrently and collect their output in loader
    /// declaration order, so document insertion order (and with it ranking
    /// tie-breaks) is identical across builds
    fn load_all(&self) -> Result<Vec<SearchableEntity>> {
        let (tx, rx) = mpsc::channel();

        for (slot, loader) in self.loaders.iter().enumerate() {
            let loader = Arc::clone(loader);
            let tx = tx.clone();
            let entity_type = loader.entity_type();
            std::thread::Builder::new()
                .name(format!("muster-loader-{entity_type}"))
                .spawn(move || {
                    let _ = tx.send((slot, loader.load()));
                })
                .expect("failed to spawn loader thread");
        }
        drop(tx);

        let deadline = Instant::now() + self.config.loader_timeout;
        let mut slots: Vec<Option<Vec<SearchableEntity>>> = vec![None; self.loaders.len()];
        let mut received = 0;

        while received < self.loaders.len() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((slot, Ok(docs))) => {
                    debug!(
                        loader = %self.loaders[slot].entity_type(),
                        documents = docs.len(),
                        "loader finished"
                    );
                    slots[slot] = Some(docs);
                    received += 1;
                }
                Ok((slot, Err(err))) => {
                    error!(
                        loader = %self.loaders[slot].entity_type(),
                        error = %err,
                        "entity loader failed, aborting build"
                    );
                    return Err(err);
                }
                Err(_) => {
                    // Timed out, or a loader thread died without reporting
                    let missing = slots
                        .iter()
                        .position(|slot| slot.is_none())
                        .unwrap_or_default();
                    let entity_type = self.loaders[missing].entity_type();
                    error!(
                        loader = %entity_type,
                        timeout_ms = self.config.loader_timeout.as_millis() as u64,
                        "entity loader timed out, aborting build"
                    );
                    return Err(Error::SourceUnavailable {
                        entity_type,
                        reason: format!(
                            "loader exceeded {}ms timeout",
                            self.config.loader_timeout.as_millis()
                        ),
                    });
                }
            }
        }

        Ok(slots.into_iter().flatten().flatten().collect())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Answer a query against the current snapshot, memoizing through the
    /// cache when one is configured
    ///
    /// A cache hit is indistinguishable from a fresh computation except for
    /// `execution_time_ms`. Every cache failure falls back to direct
    /// computation.
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        query.validate()?;
        let snapshot = self.current_snapshot().ok_or(Error::IndexNotReady)?;

        let cache_key = self.cache.as_ref().map(|_| query.cache_key());

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            match cache.get(key) {
                Ok(Some(payload)) => match serde_json::from_str::<SearchResult>(&payload) {
                    Ok(result) => {
                        debug!("search cache hit");
                        return Ok(result);
                    }
                    Err(err) => {
                        warn!(error = %err, "cached search result failed to decode, recomputing")
                    }
                },
                Ok(None) => {}
                Err(err) => warn!(error = %err, "search cache read failed, recomputing"),
            }
        }

        let result = snapshot.search(query)?;

        if let (Some(cache), Some(key)) = (&self.cache, &cache_key) {
            match serde_json::to_string(&result) {
                Ok(payload) => {
                    if let Err(err) =
                        cache.set(key, &payload, self.config.cache_ttl, &[SEARCH_CACHE_TAG])
                    {
                        warn!(error = %err, "search cache write failed");
                    }
                }
                Err(err) => warn!(error = %err, "search result did not serialize for caching"),
            }
        }

        Ok(result)
    }

    // ========================================================================
    // Observability
    // ========================================================================

    /// Document/term/facet counts and build bookkeeping
    pub fn stats(&self) -> IndexStats {
        let builds_completed = self.builds_completed.load(Ordering::Relaxed);
        match self.current_snapshot() {
            Some(snapshot) => IndexStats {
                documents: snapshot.len(),
                terms: snapshot.word_index().term_count(),
                facets: snapshot.facet_index().facet_count(),
                last_build_at: Some(snapshot.built_at()),
                builds_completed,
            },
            None => IndexStats {
                documents: 0,
                terms: 0,
                facets: 0,
                last_build_at: None,
                builds_completed,
            },
        }
    }
}
