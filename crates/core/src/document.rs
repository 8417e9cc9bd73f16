//! Document model for indexed entities
//!
//! This module defines:
//! - EntityType: closed set of indexable entity kinds
//! - DocKey: composite (type, id) index key
//! - SearchableEntity: normalized, denormalized snapshot of a source record
//!
//! Documents are created in bulk by the entity loaders during an index build
//! and replaced wholesale on refresh; nothing here mutates in place.

use crate::value::Value;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// EntityType
// ============================================================================

/// Closed set of entity kinds the engine indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    /// Training exercise
    Exercise,
    /// Weapon or sensor system
    System,
    /// Equipment item
    Equipment,
    /// Platform user
    User,
}

impl EntityType {
    /// All entity types, in loader declaration order
    pub const ALL: [EntityType; 4] = [
        EntityType::Exercise,
        EntityType::System,
        EntityType::Equipment,
        EntityType::User,
    ];

    /// Lowercase tag used for facet values and serialization
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Exercise => "exercise",
            EntityType::System => "system",
            EntityType::Equipment => "equipment",
            EntityType::User => "user",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DocKey
// ============================================================================

/// Composite index key: entity type + source identifier
///
/// Documents are always keyed by `(type, id)`, never by `id` alone, so two
/// entity types sharing an identifier value can never collide in the index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocKey {
    /// Entity type discriminant
    pub entity_type: EntityType,
    /// Identifier, unique within its entity type
    pub id: String,
}

impl DocKey {
    /// Create a new document key
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        DocKey {
            entity_type,
            id: id.into(),
        }
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_type, self.id)
    }
}

// ============================================================================
// SearchableEntity
// ============================================================================

/// Normalized, type-tagged snapshot of a source record, suitable for indexing
///
/// Loaders guarantee:
/// - `content` is lowercased and whitespace-joined from all relevant text fields
/// - `tags` contains no empty entries
/// - `metadata` holds scalars only
///
/// `search_score` is transient and query-specific: it is `None` on canonical
/// documents and only populated on the copies returned inside a `SearchResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchableEntity {
    /// Identifier, unique within `entity_type`
    pub id: String,

    /// Entity type tag
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Primary display string, always non-empty
    pub title: String,

    /// Optional secondary text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Lowercase, whitespace-joined concatenation of all searchable text
    pub content: String,

    /// Short categorical strings (status, classification, location, ...)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Named scalar values used for filtering and facet generation
    #[serde(default)]
    pub metadata: IndexMap<String, Value>,

    /// Source record creation time
    pub created_at: DateTime<Utc>,

    /// Source record last-update time; drives recency boosting
    pub updated_at: DateTime<Utc>,

    /// Query-specific relevance score, only set on result copies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_score: Option<f32>,
}

impl SearchableEntity {
    /// Create a new entity with the mandatory fields
    pub fn new(entity_type: EntityType, id: impl Into<String>, title: impl Into<String>) -> Self {
        let title = title.into();
        SearchableEntity {
            id: id.into(),
            entity_type,
            content: title.to_lowercase(),
            title,
            description: None,
            tags: vec![],
            metadata: IndexMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            search_score: None,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set the pre-lowercased searchable content
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Builder: set tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Builder: add one metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Builder: set both timestamps
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// The composite key this document is indexed under
    pub fn key(&self) -> DocKey {
        DocKey::new(self.entity_type, self.id.clone())
    }
}
