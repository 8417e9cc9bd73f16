//! Core types for the muster search engine
//!
//! This crate defines the foundational types used throughout the system:
//! - EntityType / DocKey: type-tagged document identity
//! - SearchableEntity: normalized document model
//! - Value: scalar metadata value model
//! - SearchQuery / FilterValue / SearchResult: query boundary types
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod search_types;
pub mod value;

// Re-export commonly used types
pub use document::{DocKey, EntityType, SearchableEntity};
pub use error::{Error, Result};
pub use search_types::{
    default_facets, FacetCount, FilterValue, SearchQuery, SearchResult, SortBy, SortOrder,
    DEFAULT_LIMIT, DEFAULT_PAGE,
};
pub use value::Value;
