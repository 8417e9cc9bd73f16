//! Source-store abstraction
//!
//! The relational store that owns authoritative records is an external
//! collaborator: this module only defines the bulk-read seam the entity
//! loaders use, plus an in-memory implementation for tests and embedding
//! hosts. Records cross the seam as raw JSON rows; loaders project them
//! into documents.

use std::collections::{HashMap, HashSet};
use std::time::Duration;
use thiserror::Error;

/// Failure to reach or read a source collection
#[derive(Debug, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

/// Bulk-read access to one backing store
///
/// Implementations must tolerate being called concurrently, both with each
/// other and with normal CRUD traffic against the same store; read isolation
/// is the store's responsibility.
pub trait SourceStore: Send + Sync {
    /// Fetch every current record of one collection
    fn fetch_all(&self, collection: &str) -> Result<Vec<serde_json::Value>, SourceError>;
}

/// In-memory source store backed by static collections
///
/// Supports injected failures and artificial latency so loader error and
/// timeout paths are testable.
#[derive(Debug, Default)]
pub struct StaticSource {
    collections: HashMap<String, Vec<serde_json::Value>>,
    failing: HashSet<String>,
    latency: Option<Duration>,
}

impl StaticSource {
    /// Create an empty source
    pub fn new() -> Self {
        StaticSource::default()
    }

    /// Builder: seed one collection with records
    pub fn with_collection(
        mut self,
        name: impl Into<String>,
        records: Vec<serde_json::Value>,
    ) -> Self {
        self.collections.insert(name.into(), records);
        self
    }

    /// Builder: make reads of one collection fail
    pub fn with_failure(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    /// Builder: delay every read by the given duration
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

impl SourceStore for StaticSource {
    fn fetch_all(&self, collection: &str) -> Result<Vec<serde_json::Value>, SourceError> {
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        if self.failing.contains(collection) {
            return Err(SourceError(format!("collection '{collection}' unreachable")));
        }
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }
}
