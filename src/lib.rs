//! Muster - in-memory multi-entity search and indexing engine
//!
//! Muster builds a searchable representation of heterogeneous catalog
//! records (exercises, systems, equipment, users), maintains inverted-word
//! and faceted indexes over them, and answers ranked, filtered, paginated
//! queries with facet counts and query suggestions.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use muster::{default_loaders, IndexManager, SearchQuery, StaticSource};
//!
//! let store = Arc::new(StaticSource::new().with_collection(
//!     "exercises",
//!     vec![serde_json::json!({"id": "EX-1", "name": "Night Raid Alpha"})],
//! ));
//!
//! let manager = IndexManager::new(default_loaders(store));
//! manager.build_index()?;
//!
//! let result = manager.search(&SearchQuery::new("night"))?;
//! assert_eq!(result.total, 1);
//! # Ok::<(), muster::Error>(())
//! ```
//!
//! # Architecture
//!
//! The index is rebuilt from source data and published as an immutable
//! snapshot behind a single atomic reference swap: queries never observe a
//! partially built index, and builds never block reads. The lifecycle
//! (first build, refresh, periodic scheduling, shutdown) is driven by the
//! hosting application through [`IndexManager`] and
//! [`schedule_periodic_refresh`].

// Re-export the public API from the member crates
pub use muster_core::{
    default_facets, DocKey, EntityType, Error, FacetCount, FilterValue, Result, SearchQuery,
    SearchResult, SearchableEntity, SortBy, SortOrder, Value, DEFAULT_LIMIT, DEFAULT_PAGE,
};
pub use muster_engine::{
    default_loaders, schedule_periodic_refresh, CacheStats, EngineConfig, EntityLoader,
    EquipmentLoader, ExerciseLoader, IndexManager, IndexState, IndexStats, MemoryCache,
    RefreshHandle, ResultCache, SourceError, SourceStore, StaticSource, SystemLoader, UserLoader,
    SEARCH_CACHE_TAG,
};
pub use muster_search::{tokenize, tokenize_unique, FacetIndex, IndexSnapshot, WordIndex};
