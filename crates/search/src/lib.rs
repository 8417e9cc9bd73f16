//! Search core for muster
//!
//! This crate provides the in-memory search machinery:
//! - Tokenizer for indexing and query text
//! - WordIndex: inverted term → document-key mapping
//! - FacetIndex: facet name → value → document-key mapping
//! - IndexSnapshot: immutable (documents, word index, facet index) triple
//! - Query execution: candidate selection, filtering, scoring, sorting,
//!   pagination, facet aggregation, suggestions
//!
//! Snapshots are built whole and swapped atomically by the lifecycle layer
//! in `muster-engine`; nothing in this crate mutates a published index.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod facet_index;
pub mod query;
pub mod snapshot;
pub mod tokenizer;
pub mod word_index;

pub use facet_index::{FacetIndex, FACET_TAGS, FACET_TYPE};
pub use query::execute;
pub use snapshot::IndexSnapshot;
pub use tokenizer::{tokenize, tokenize_unique};
pub use word_index::WordIndex;
