//! Inverted word index: term → document-key set
//!
//! Built once per snapshot from every document's `content` and never
//! mutated afterwards. Lookups come in two flavors: exact term match and a
//! deliberately permissive bidirectional-substring match (recall-biased,
//! since the corpus is small and users expect partial-word hits: "heli"
//! should surface "helium").

use crate::tokenizer::tokenize;
use muster_core::{DocKey, SearchableEntity};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Inverted mapping from indexed term to the documents containing it
///
/// The term dictionary is a `BTreeMap` so prefix scans (suggestion
/// generation) are range queries rather than full iterations.
#[derive(Debug, Default)]
pub struct WordIndex {
    terms: BTreeMap<String, FxHashSet<DocKey>>,
}

impl WordIndex {
    /// Build a fresh index over the given document registry
    pub fn build(documents: &IndexMap<DocKey, SearchableEntity>) -> Self {
        let mut terms: BTreeMap<String, FxHashSet<DocKey>> = BTreeMap::new();
        for (key, doc) in documents {
            for term in tokenize(&doc.content) {
                terms.entry(term).or_default().insert(key.clone());
            }
        }
        WordIndex { terms }
    }

    /// Documents whose content contains `term` exactly
    pub fn lookup(&self, term: &str) -> Option<&FxHashSet<DocKey>> {
        self.terms.get(term)
    }

    /// Documents containing any indexed term in a bidirectional substring
    /// relationship with `term` (either contains the other)
    ///
    /// Includes the exact match itself: equal strings contain each other.
    pub fn partial_lookup(&self, term: &str) -> FxHashSet<DocKey> {
        let mut matched = FxHashSet::default();
        for (indexed, docs) in &self.terms {
            if indexed.contains(term) || term.contains(indexed.as_str()) {
                matched.extend(docs.iter().cloned());
            }
        }
        matched
    }

    /// Indexed terms starting with `prefix`, in lexicographic order
    pub fn terms_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.terms
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(term, _)| term.as_str())
            .take_while(move |term| term.starts_with(prefix))
    }

    /// Number of distinct indexed terms
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Check if the index holds no terms
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_core::EntityType;

    fn registry(docs: Vec<SearchableEntity>) -> IndexMap<DocKey, SearchableEntity> {
        docs.into_iter().map(|d| (d.key(), d)).collect()
    }

    fn doc(entity_type: EntityType, id: &str, content: &str) -> SearchableEntity {
        SearchableEntity::new(entity_type, id, id).with_content(content.to_string())
    }

    #[test]
    fn test_build_and_lookup() {
        let docs = registry(vec![
            doc(EntityType::Exercise, "A", "night raid alpha"),
            doc(EntityType::System, "B", "recon drone"),
        ]);
        let index = WordIndex::build(&docs);

        let hits = index.lookup("night").unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits.contains(&DocKey::new(EntityType::Exercise, "A")));
        assert!(index.lookup("recon").is_some());
        assert!(index.lookup("missing").is_none());
    }

    #[test]
    fn test_same_term_multiple_documents() {
        let docs = registry(vec![
            doc(EntityType::Exercise, "A", "night raid"),
            doc(EntityType::Equipment, "C", "night vision goggles"),
        ]);
        let index = WordIndex::build(&docs);

        assert_eq!(index.lookup("night").unwrap().len(), 2);
    }

    #[test]
    fn test_type_isolation_in_doc_sets() {
        // Two types sharing an id value must both be present
        let docs = registry(vec![
            doc(EntityType::Exercise, "X1", "shared identifier"),
            doc(EntityType::Equipment, "X1", "shared identifier"),
        ]);
        let index = WordIndex::build(&docs);

        let hits = index.lookup("shared").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.contains(&DocKey::new(EntityType::Exercise, "X1")));
        assert!(hits.contains(&DocKey::new(EntityType::Equipment, "X1")));
    }

    #[test]
    fn test_partial_lookup_query_is_prefix_of_indexed() {
        let docs = registry(vec![doc(EntityType::System, "B", "helium sensor")]);
        let index = WordIndex::build(&docs);

        // "heli" is a substring of indexed "helium"
        let hits = index.partial_lookup("heli");
        assert!(hits.contains(&DocKey::new(EntityType::System, "B")));
    }

    #[test]
    fn test_partial_lookup_indexed_is_substring_of_query() {
        let docs = registry(vec![doc(EntityType::System, "B", "heli pad")]);
        let index = WordIndex::build(&docs);

        // indexed "heli" is a substring of the query term "helicopter"
        let hits = index.partial_lookup("helicopter");
        assert!(hits.contains(&DocKey::new(EntityType::System, "B")));
    }

    #[test]
    fn test_partial_lookup_includes_exact() {
        let docs = registry(vec![doc(EntityType::Exercise, "A", "raid")]);
        let index = WordIndex::build(&docs);
        assert_eq!(index.partial_lookup("raid").len(), 1);
    }

    #[test]
    fn test_partial_lookup_no_relation() {
        let docs = registry(vec![doc(EntityType::Exercise, "A", "raid")]);
        let index = WordIndex::build(&docs);
        assert!(index.partial_lookup("drone").is_empty());
    }

    #[test]
    fn test_terms_with_prefix_sorted() {
        let docs = registry(vec![doc(
            EntityType::Exercise,
            "A",
            "recon reconnaissance recovery raid",
        )]);
        let index = WordIndex::build(&docs);

        let completions: Vec<&str> = index.terms_with_prefix("rec").collect();
        assert_eq!(completions, vec!["recon", "reconnaissance", "recovery"]);
    }

    #[test]
    fn test_terms_with_prefix_empty() {
        let index = WordIndex::default();
        assert_eq!(index.terms_with_prefix("x").count(), 0);
    }

    #[test]
    fn test_term_count() {
        let docs = registry(vec![doc(EntityType::Exercise, "A", "alpha bravo alpha")]);
        let index = WordIndex::build(&docs);
        assert_eq!(index.term_count(), 2);
        assert!(!index.is_empty());
    }
}
