//! Lifecycle engine for muster
//!
//! This crate wires the search core to the outside world:
//! - SourceStore: bulk-read seam to the external data store
//! - EntityLoader + per-type loaders: raw records → `SearchableEntity`
//! - ResultCache + MemoryCache: optional memoization of search results
//! - IndexManager: snapshot ownership, atomic publish, cached queries
//! - schedule_periodic_refresh: background refresh with cooperative cancel

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod lifecycle;
pub mod loader;
pub mod refresh;
pub mod source;

pub use cache::{CacheStats, MemoryCache, ResultCache};
pub use lifecycle::{
    EngineConfig, IndexManager, IndexState, IndexStats, SEARCH_CACHE_TAG,
};
pub use loader::{
    default_loaders, EntityLoader, EquipmentLoader, ExerciseLoader, SystemLoader, UserLoader,
    EQUIPMENT_COLLECTION, EXERCISES_COLLECTION, SYSTEMS_COLLECTION, USERS_COLLECTION,
};
pub use refresh::{schedule_periodic_refresh, RefreshHandle};
pub use source::{SourceError, SourceStore, StaticSource};
