//! Facet index: facet name → facet value → document-key set
//!
//! Built once per snapshot, alongside the word index, from three sources:
//! the entity type (facet `type`), each tag (facet `tags`), and every
//! string-valued metadata entry (faceted under its own key). Numeric and
//! boolean metadata stay filter-only.

use muster_core::{DocKey, FacetCount, SearchableEntity};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

/// Facet name carrying the entity type of every document
pub const FACET_TYPE: &str = "type";

/// Facet name carrying document tags
pub const FACET_TAGS: &str = "tags";

/// Mapping from facet name to value to the documents carrying that value
#[derive(Debug, Default)]
pub struct FacetIndex {
    facets: FxHashMap<String, FxHashMap<String, FxHashSet<DocKey>>>,
}

impl FacetIndex {
    /// Build a fresh facet index over the given document registry
    pub fn build(documents: &IndexMap<DocKey, SearchableEntity>) -> Self {
        let mut index = FacetIndex::default();
        for (key, doc) in documents {
            index.register(FACET_TYPE, doc.entity_type.as_str(), key);
            for tag in &doc.tags {
                index.register(FACET_TAGS, tag, key);
            }
            for (name, value) in &doc.metadata {
                if let Some(s) = value.as_str() {
                    index.register(name, s, key);
                }
            }
        }
        index
    }

    fn register(&mut self, facet: &str, value: &str, key: &DocKey) {
        self.facets
            .entry(facet.to_string())
            .or_default()
            .entry(value.to_string())
            .or_default()
            .insert(key.clone());
    }

    /// Value → count breakdown for one facet, restricted to a candidate set
    ///
    /// Values with zero candidates are omitted; the result is sorted by
    /// descending count, then ascending value for determinism. Unknown facet
    /// names yield an empty list.
    pub fn counts_for(&self, facet: &str, candidates: &FxHashSet<DocKey>) -> Vec<FacetCount> {
        let Some(values) = self.facets.get(facet) else {
            return vec![];
        };

        let mut counts: Vec<FacetCount> = values
            .iter()
            .map(|(value, docs)| {
                let count = docs.iter().filter(|key| candidates.contains(*key)).count();
                FacetCount::new(value.clone(), count)
            })
            .filter(|fc| fc.count > 0)
            .collect();

        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        counts
    }

    /// Number of distinct (facet, value) pairs indexed
    pub fn facet_count(&self) -> usize {
        self.facets.values().map(|values| values.len()).sum()
    }

    /// Check whether a facet name is indexed at all
    pub fn contains_facet(&self, facet: &str) -> bool {
        self.facets.contains_key(facet)
    }
}
