//! Immutable index snapshot
//!
//! One snapshot is the complete, internally consistent triple of
//! (document registry, word index, facet index), built in a single pass and
//! never mutated afterwards. The lifecycle manager publishes snapshots by
//! atomically swapping an `Arc`; queries only ever see a fully built one.
//!
//! The registry preserves loader insertion order: that order is the stable
//! tie-break for ranking and the iteration order for candidate selection.

use crate::facet_index::FacetIndex;
use crate::query;
use crate::word_index::WordIndex;
use chrono::{DateTime, Utc};
use muster_core::{DocKey, Result, SearchQuery, SearchResult, SearchableEntity};
use indexmap::IndexMap;

/// A complete, immutable index over one generation of source documents
#[derive(Debug)]
pub struct IndexSnapshot {
    documents: IndexMap<DocKey, SearchableEntity>,
    word_index: WordIndex,
    facet_index: FacetIndex,
    built_at: DateTime<Utc>,
}

impl IndexSnapshot {
    /// Build a snapshot from loader output
    ///
    /// Word and facet indexes are derived from the same registry in the same
    /// pass, so they can never disagree about which documents exist. A later
    /// document with a duplicate `(type, id)` key replaces the earlier one.
    pub fn build(documents: Vec<SearchableEntity>) -> Self {
        let mut registry = IndexMap::with_capacity(documents.len());
        for doc in documents {
            registry.insert(doc.key(), doc);
        }
        let word_index = WordIndex::build(&registry);
        let facet_index = FacetIndex::build(&registry);
        IndexSnapshot {
            documents: registry,
            word_index,
            facet_index,
            built_at: Utc::now(),
        }
    }

    /// Build an empty snapshot (useful for tests and cold starts)
    pub fn empty() -> Self {
        Self::build(vec![])
    }

    /// Answer a query against this snapshot
    pub fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
        query::execute(self, query)
    }

    /// The document registry, in insertion order
    pub fn documents(&self) -> &IndexMap<DocKey, SearchableEntity> {
        &self.documents
    }

    /// Look up one document by key
    pub fn get(&self, key: &DocKey) -> Option<&SearchableEntity> {
        self.documents.get(key)
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the snapshot holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The inverted word index
    pub fn word_index(&self) -> &WordIndex {
        &self.word_index
    }

    /// The facet index
    pub fn facet_index(&self) -> &FacetIndex {
        &self.facet_index
    }

    /// When this snapshot finished building
    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }
}
