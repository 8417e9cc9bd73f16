//! Text tokenizer for indexing and query processing
//!
//! Pipeline: lowercase → non-word characters to whitespace → split on
//! whitespace runs → drop short tokens → drop stopwords
//!
//! Deliberately simpler than a full analysis chain (no stemming, no
//! possessive stripping): exact and substring term matching downstream
//! expect tokens to stay close to the source text.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Tokens shorter than this carry too little signal to index.
const MIN_TOKEN_LEN: usize = 3;

/// Articles, prepositions, and common auxiliary verbs excluded from indexing.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "but", "nor", "for", "yet", "are", "was", "were", "been", "being", "has",
        "have", "had", "does", "did", "will", "would", "could", "should", "may", "might", "must",
        "can", "shall", "this", "that", "these", "those", "with", "from", "into", "onto", "over",
        "under", "about", "after", "before", "between", "during", "their", "there", "then", "than",
        "its", "not", "out", "off", "per", "via",
    ]
    .into_iter()
    .collect()
});

/// Tokenize text into searchable terms.
///
/// - Lowercase
/// - Replace non-word characters (anything but letters, digits, `_`) with whitespace
/// - Split on whitespace runs
/// - Drop tokens shorter than 3 characters
/// - Drop stopwords
///
/// Pure and deterministic. The returned sequence may contain duplicate
/// terms; callers that need uniqueness dedupe via [`tokenize_unique`].
///
/// # Example
///
/// ```
/// use muster_search::tokenizer::tokenize;
///
/// let tokens = tokenize("The Quick-Fox!");
/// assert_eq!(tokens, vec!["quick", "fox"]);
/// ```
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .filter(|t| !STOP_WORDS.contains(t))
        .map(String::from)
        .collect()
}

/// Tokenize and deduplicate, preserving first-occurrence order.
///
/// # Example
///
/// ```
/// use muster_search::tokenizer::tokenize_unique;
///
/// let tokens = tokenize_unique("drone drone DRONE");
/// assert_eq!(tokens, vec!["drone"]);
/// ```
pub fn tokenize_unique(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(text)
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect()
}
