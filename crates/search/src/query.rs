//! Query execution over an index snapshot
//!
//! Pipeline, in order: candidate selection (text match ∪ match-all),
//! filter narrowing, type narrowing, additive scoring, stable sort,
//! pagination, facet aggregation over the pre-pagination candidate set,
//! suggestion generation, result assembly.
//!
//! Scores are computed per query and attached only to the returned copies;
//! the snapshot is never mutated.

use crate::snapshot::IndexSnapshot;
use crate::tokenizer::{tokenize, tokenize_unique};
use crate::word_index::WordIndex;
use chrono::{DateTime, Duration, Utc};
use muster_core::{
    DocKey, FacetCount, FilterValue, Result, SearchQuery, SearchResult, SearchableEntity, SortBy,
    SortOrder, DEFAULT_LIMIT, DEFAULT_PAGE,
};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::time::Instant;

/// Title contains the full query text as a substring
const SCORE_TITLE_MATCH: f32 = 10.0;

/// Query term appears as an exact token in the document content
const SCORE_EXACT_TERM: f32 = 5.0;

/// Query term in a bidirectional substring relation with a document token.
/// Exact matches also earn this: the double count is intentional, biasing
/// toward documents with many weak matches as well as few strong ones.
const SCORE_PARTIAL_TERM: f32 = 2.0;

/// Query term is a case-insensitive substring of a tag
const SCORE_TAG_MATCH: f32 = 3.0;

/// Document updated within the recency window
const SCORE_RECENCY_BONUS: f32 = 1.0;

/// Recency window for the update bonus
const RECENCY_WINDOW_DAYS: i64 = 7;

/// Facet values reported per facet name
const MAX_FACET_VALUES: usize = 10;

/// Suggestions reported per query
const MAX_SUGGESTIONS: usize = 5;

/// Execute a query against a snapshot
pub fn execute(snapshot: &IndexSnapshot, query: &SearchQuery) -> Result<SearchResult> {
    query.validate()?;
    let started = Instant::now();

    // Out-of-range pagination values normalize to defaults instead of erroring
    let page = query.page.max(DEFAULT_PAGE);
    let limit = if query.limit == 0 {
        DEFAULT_LIMIT
    } else {
        query.limit
    };

    let query_text = query.query_text.trim();
    let query_lower = query_text.to_lowercase();
    let query_terms = tokenize_unique(query_text);

    // 1. Candidate selection: union of exact and partial matches per term,
    //    or every document when the query text is empty.
    let text_matched: Option<FxHashSet<DocKey>> = if query_text.is_empty() {
        None
    } else {
        let mut matched = FxHashSet::default();
        for term in &query_terms {
            if let Some(exact) = snapshot.word_index().lookup(term) {
                matched.extend(exact.iter().cloned());
            }
            matched.extend(snapshot.word_index().partial_lookup(term));
        }
        Some(matched)
    };

    // 2. + 3. Filter and type narrowing, iterated in registry insertion
    //    order so downstream stable sorting has a deterministic tie-break.
    let candidates: Vec<(&DocKey, &SearchableEntity)> = snapshot
        .documents()
        .iter()
        .filter(|(key, _)| text_matched.as_ref().map_or(true, |m| m.contains(*key)))
        .filter(|(_, doc)| passes_filters(doc, &query.filters))
        .filter(|(_, doc)| {
            query
                .entity_types
                .as_ref()
                .map_or(true, |types| types.contains(&doc.entity_type))
        })
        .collect();

    let total = candidates.len();
    let candidate_keys: FxHashSet<DocKey> = candidates.iter().map(|(k, _)| (*k).clone()).collect();

    // 4. Scoring. An empty query scores every survivor 1.
    let now = Utc::now();
    let mut scored: Vec<(f32, &SearchableEntity)> = if query_text.is_empty() {
        candidates.into_iter().map(|(_, doc)| (1.0, doc)).collect()
    } else {
        // Resolve per-term doc sets once; membership tests are then O(1)
        let exact_sets: Vec<Option<&FxHashSet<DocKey>>> = query_terms
            .iter()
            .map(|term| snapshot.word_index().lookup(term))
            .collect();
        let partial_sets: Vec<FxHashSet<DocKey>> = query_terms
            .iter()
            .map(|term| snapshot.word_index().partial_lookup(term))
            .collect();

        candidates
            .into_iter()
            .map(|(key, doc)| {
                let score = score_document(
                    key,
                    doc,
                    &query_lower,
                    &query_terms,
                    &exact_sets,
                    &partial_sets,
                    now,
                );
                (score, doc)
            })
            .collect()
    };

    // 5. Stable sort; ties keep insertion order in either direction.
    sort_scored(&mut scored, query.sort_by, query.sort_order);

    // 6. Pagination over the sorted list.
    let offset = (page - 1).saturating_mul(limit);
    let items: Vec<SearchableEntity> = scored
        .iter()
        .skip(offset)
        .take(limit)
        .map(|(score, doc)| {
            let mut item = (*doc).clone();
            item.search_score = Some(*score);
            item
        })
        .collect();

    // 7. Facets describe the whole candidate set, not the current page.
    let mut facets = IndexMap::new();
    for name in &query.facets {
        let counts: Vec<FacetCount> = snapshot
            .facet_index()
            .counts_for(name, &candidate_keys)
            .into_iter()
            .take(MAX_FACET_VALUES)
            .collect();
        facets.insert(name.clone(), counts);
    }

    // 8. Suggestions complete the last query term.
    let suggestions = build_suggestions(snapshot.word_index(), query_text);

    // 9. Assemble.
    Ok(SearchResult {
        items,
        total,
        facets,
        suggestions,
        execution_time_ms: started.elapsed().as_millis() as u64,
        page,
        limit,
    })
}

/// Conjunction over every non-noop filter entry
fn passes_filters(
    doc: &SearchableEntity,
    filters: &IndexMap<String, FilterValue>,
) -> bool {
    filters
        .iter()
        .all(|(name, filter)| filter.matches(doc.metadata.get(name)))
}

fn score_document(
    key: &DocKey,
    doc: &SearchableEntity,
    query_lower: &str,
    query_terms: &[String],
    exact_sets: &[Option<&FxHashSet<DocKey>>],
    partial_sets: &[FxHashSet<DocKey>],
    now: DateTime<Utc>,
) -> f32 {
    let mut score = 0.0;

    if doc.title.to_lowercase().contains(query_lower) {
        score += SCORE_TITLE_MATCH;
    }

    for (i, term) in query_terms.iter().enumerate() {
        if exact_sets[i].map_or(false, |docs| docs.contains(key)) {
            score += SCORE_EXACT_TERM;
        }
        if partial_sets[i].contains(key) {
            score += SCORE_PARTIAL_TERM;
        }
        if doc
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(term.as_str()))
        {
            score += SCORE_TAG_MATCH;
        }
    }

    if now.signed_duration_since(doc.updated_at) <= Duration::days(RECENCY_WINDOW_DAYS) {
        score += SCORE_RECENCY_BONUS;
    }

    score
}

/// Stable sort by the requested key and direction
///
/// `Vec::sort_by` is stable, and descending order is expressed by flipping
/// the operands rather than the ordering, so equal keys always keep their
/// insertion order.
fn sort_scored(scored: &mut [(f32, &SearchableEntity)], sort_by: SortBy, sort_order: SortOrder) {
    let cmp = |a: &(f32, &SearchableEntity), b: &(f32, &SearchableEntity)| -> Ordering {
        match sort_by {
            SortBy::Relevance => a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal),
            SortBy::Title => a.1.title.to_lowercase().cmp(&b.1.title.to_lowercase()),
            SortBy::Created => a.1.created_at.cmp(&b.1.created_at),
            SortBy::Updated => a.1.updated_at.cmp(&b.1.updated_at),
        }
    };
    match sort_order {
        SortOrder::Asc => scored.sort_by(|a, b| cmp(a, b)),
        SortOrder::Desc => scored.sort_by(|a, b| cmp(b, a)),
    }
}

/// Propose completions of the last query term, substituted into the query
fn build_suggestions(word_index: &WordIndex, query_text: &str) -> Vec<String> {
    let terms = tokenize(query_text);
    let Some(last) = terms.last() else {
        return vec![];
    };

    let words: Vec<&str> = query_text.split_whitespace().collect();
    let head = &words[..words.len().saturating_sub(1)];

    word_index
        .terms_with_prefix(last)
        .filter(|completion| *completion != last.as_str())
        .take(MAX_SUGGESTIONS)
        .map(|completion| {
            let mut parts = head.to_vec();
            parts.push(completion);
            parts.join(" ")
        })
        .collect()
}
