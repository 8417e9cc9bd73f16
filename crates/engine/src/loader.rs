//! Entity loaders: one per source collection
//!
//! Each loader fetches the raw records of one entity type and projects them
//! into `SearchableEntity` documents. Projection guarantees:
//! - `content` is lowercased and whitespace-joined from the type's text fields
//! - `tags` contains no empty entries and no duplicates
//! - `metadata` holds scalars only
//! - malformed or missing timestamps degrade to the Unix epoch per document
//!   (no recency boost) instead of failing the build
//!
//! A loader whose store read fails returns `SourceUnavailable`; the
//! lifecycle manager aborts the whole build on any loader failure.

use crate::source::SourceStore;
use chrono::{DateTime, Utc};
use muster_core::{EntityType, Error, Result, SearchableEntity, Value};
use std::sync::Arc;
use tracing::debug;

/// Collection read by the exercise loader
pub const EXERCISES_COLLECTION: &str = "exercises";
/// Collection read by the system loader
pub const SYSTEMS_COLLECTION: &str = "systems";
/// Collection read by the equipment loader
pub const EQUIPMENT_COLLECTION: &str = "equipment";
/// Collection read by the user loader
pub const USERS_COLLECTION: &str = "users";

/// Fetch raw records of one entity type and project them to documents
pub trait EntityLoader: Send + Sync {
    /// The entity type this loader produces
    fn entity_type(&self) -> EntityType;

    /// Fetch and project every current record
    fn load(&self) -> Result<Vec<SearchableEntity>>;
}

/// All loaders over one store, in entity-type declaration order
pub fn default_loaders(store: Arc<dyn SourceStore>) -> Vec<Arc<dyn EntityLoader>> {
    vec![
        Arc::new(ExerciseLoader::new(Arc::clone(&store))),
        Arc::new(SystemLoader::new(Arc::clone(&store))),
        Arc::new(EquipmentLoader::new(Arc::clone(&store))),
        Arc::new(UserLoader::new(store)),
    ]
}

// ============================================================================
// Projection helpers
// ============================================================================

/// Record identifier as a string; records without one are skipped
fn record_id(record: &serde_json::Value) -> Option<String> {
    match record.get("id") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => {
            debug!("skipping source record without usable id");
            None
        }
    }
}

/// Non-empty string field
fn str_field(record: &serde_json::Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// String-array field, empty entries dropped
fn str_list_field(record: &serde_json::Value, key: &str) -> Vec<String> {
    record
        .get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Numeric field as a scalar metadata value (Int when integral)
fn num_field(record: &serde_json::Value, key: &str) -> Option<Value> {
    let n = record.get(key)?.as_f64()?;
    if let Some(i) = record.get(key).and_then(|v| v.as_i64()) {
        Some(Value::Int(i))
    } else {
        Some(Value::Float(n))
    }
}

/// RFC 3339 timestamp, degrading to the Unix epoch on absence or parse
/// failure so a malformed record costs one recency boost, not the build
fn timestamp_field(record: &serde_json::Value, key: &str) -> DateTime<Utc> {
    match record.get(key).and_then(|v| v.as_str()) {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(err) => {
                debug!(field = key, value = raw, error = %err, "malformed timestamp, using epoch");
                DateTime::<Utc>::UNIX_EPOCH
            }
        },
        None => DateTime::<Utc>::UNIX_EPOCH,
    }
}

/// Lowercased, whitespace-joined concatenation of the given text parts
fn build_content(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Drop empty tags and duplicates, preserving first-occurrence order
fn clean_tags(candidates: Vec<Option<String>>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in candidates.into_iter().flatten() {
        let tag = tag.trim().to_string();
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    tags
}

fn fetch(
    store: &Arc<dyn SourceStore>,
    collection: &str,
    entity_type: EntityType,
) -> Result<Vec<serde_json::Value>> {
    store
        .fetch_all(collection)
        .map_err(|err| Error::SourceUnavailable {
            entity_type,
            reason: err.to_string(),
        })
}

// ============================================================================
// ExerciseLoader
// ============================================================================

/// Loads training exercises
pub struct ExerciseLoader {
    store: Arc<dyn SourceStore>,
}

impl ExerciseLoader {
    /// Create a loader over the given store
    pub fn new(store: Arc<dyn SourceStore>) -> Self {
        ExerciseLoader { store }
    }

    fn project(record: &serde_json::Value) -> Option<SearchableEntity> {
        let id = record_id(record)?;
        let title = str_field(record, "name").unwrap_or_else(|| id.clone());
        let description = str_field(record, "description");
        let status = str_field(record, "status");
        let classification = str_field(record, "classification");
        let location = str_field(record, "location");
        let objectives = str_list_field(record, "objectives").join(" ");

        let content = build_content(&[
            Some(title.as_str()),
            description.as_deref(),
            Some(objectives.as_str()),
            status.as_deref(),
            classification.as_deref(),
            location.as_deref(),
        ]);

        let mut doc = SearchableEntity::new(EntityType::Exercise, id, title)
            .with_content(content)
            .with_tags(clean_tags(vec![
                status.clone(),
                classification.clone(),
                location.clone(),
            ]))
            .with_timestamps(
                timestamp_field(record, "createdAt"),
                timestamp_field(record, "updatedAt"),
            );
        doc.description = description;

        if let Some(status) = status {
            doc.metadata.insert("status".into(), Value::Str(status));
        }
        if let Some(classification) = classification {
            doc.metadata
                .insert("classification".into(), Value::Str(classification));
        }
        if let Some(location) = location {
            doc.metadata.insert("location".into(), Value::Str(location));
        }
        if let Some(count) = num_field(record, "participantCount") {
            doc.metadata.insert("participantCount".into(), count);
        }

        Some(doc)
    }
}

impl EntityLoader for ExerciseLoader {
    fn entity_type(&self) -> EntityType {
        EntityType::Exercise
    }

    fn load(&self) -> Result<Vec<SearchableEntity>> {
        let records = fetch(&self.store, EXERCISES_COLLECTION, EntityType::Exercise)?;
        Ok(records.iter().filter_map(Self::project).collect())
    }
}

// ============================================================================
// SystemLoader
// ============================================================================

/// Loads weapon and sensor systems
pub struct SystemLoader {
    store: Arc<dyn SourceStore>,
}

impl SystemLoader {
    /// Create a loader over the given store
    pub fn new(store: Arc<dyn SourceStore>) -> Self {
        SystemLoader { store }
    }

    fn project(record: &serde_json::Value) -> Option<SearchableEntity> {
        let id = record_id(record)?;
        let title = str_field(record, "name").unwrap_or_else(|| id.clone());
        let description = str_field(record, "description");
        let category = str_field(record, "category");
        let status = str_field(record, "status");
        let manufacturer = str_field(record, "manufacturer");

        let content = build_content(&[
            Some(title.as_str()),
            description.as_deref(),
            category.as_deref(),
            status.as_deref(),
            manufacturer.as_deref(),
        ]);

        let mut doc = SearchableEntity::new(EntityType::System, id, title)
            .with_content(content)
            .with_tags(clean_tags(vec![category.clone(), status.clone()]))
            .with_timestamps(
                timestamp_field(record, "createdAt"),
                timestamp_field(record, "updatedAt"),
            );
        doc.description = description;

        if let Some(category) = category {
            doc.metadata.insert("category".into(), Value::Str(category));
        }
        if let Some(status) = status {
            doc.metadata.insert("status".into(), Value::Str(status));
        }
        if let Some(manufacturer) = manufacturer {
            doc.metadata
                .insert("manufacturer".into(), Value::Str(manufacturer));
        }

        Some(doc)
    }
}

impl EntityLoader for SystemLoader {
    fn entity_type(&self) -> EntityType {
        EntityType::System
    }

    fn load(&self) -> Result<Vec<SearchableEntity>> {
        let records = fetch(&self.store, SYSTEMS_COLLECTION, EntityType::System)?;
        Ok(records.iter().filter_map(Self::project).collect())
    }
}

// ============================================================================
// EquipmentLoader
// ============================================================================

/// Loads equipment items
pub struct EquipmentLoader {
    store: Arc<dyn SourceStore>,
}

impl EquipmentLoader {
    /// Create a loader over the given store
    pub fn new(store: Arc<dyn SourceStore>) -> Self {
        EquipmentLoader { store }
    }

    fn project(record: &serde_json::Value) -> Option<SearchableEntity> {
        let id = record_id(record)?;
        let title = str_field(record, "name").unwrap_or_else(|| id.clone());
        let description = str_field(record, "description");
        let category = str_field(record, "category");
        let condition = str_field(record, "condition");
        let location = str_field(record, "location");

        let content = build_content(&[
            Some(title.as_str()),
            description.as_deref(),
            category.as_deref(),
            condition.as_deref(),
            location.as_deref(),
        ]);

        let mut doc = SearchableEntity::new(EntityType::Equipment, id, title)
            .with_content(content)
            .with_tags(clean_tags(vec![
                category.clone(),
                condition.clone(),
                location.clone(),
            ]))
            .with_timestamps(
                timestamp_field(record, "createdAt"),
                timestamp_field(record, "updatedAt"),
            );
        doc.description = description;

        if let Some(category) = category {
            doc.metadata.insert("category".into(), Value::Str(category));
        }
        if let Some(condition) = condition {
            doc.metadata
                .insert("condition".into(), Value::Str(condition));
        }
        if let Some(location) = location {
            doc.metadata.insert("location".into(), Value::Str(location));
        }
        if let Some(price) = num_field(record, "basePrice") {
            doc.metadata.insert("basePrice".into(), price);
        }
        if let Some(quantity) = num_field(record, "quantity") {
            doc.metadata.insert("quantity".into(), quantity);
        }

        Some(doc)
    }
}

impl EntityLoader for EquipmentLoader {
    fn entity_type(&self) -> EntityType {
        EntityType::Equipment
    }

    fn load(&self) -> Result<Vec<SearchableEntity>> {
        let records = fetch(&self.store, EQUIPMENT_COLLECTION, EntityType::Equipment)?;
        Ok(records.iter().filter_map(Self::project).collect())
    }
}

// ============================================================================
// UserLoader
// ============================================================================

/// Loads platform users
pub struct UserLoader {
    store: Arc<dyn SourceStore>,
}

impl UserLoader {
    /// Create a loader over the given store
    pub fn new(store: Arc<dyn SourceStore>) -> Self {
        UserLoader { store }
    }

    fn project(record: &serde_json::Value) -> Option<SearchableEntity> {
        let id = record_id(record)?;
        let rank = str_field(record, "rank");
        let first_name = str_field(record, "firstName");
        let last_name = str_field(record, "lastName");
        let role = str_field(record, "role");
        let unit = str_field(record, "unit");
        let email = str_field(record, "email");

        let display_name = [rank.as_deref(), first_name.as_deref(), last_name.as_deref()]
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        let title = if display_name.is_empty() {
            id.clone()
        } else {
            display_name
        };

        let content = build_content(&[
            Some(title.as_str()),
            role.as_deref(),
            unit.as_deref(),
            email.as_deref(),
        ]);

        let mut doc = SearchableEntity::new(EntityType::User, id, title)
            .with_content(content)
            .with_tags(clean_tags(vec![role.clone(), unit.clone()]))
            .with_timestamps(
                timestamp_field(record, "createdAt"),
                timestamp_field(record, "updatedAt"),
            );
        doc.description = role.clone();

        if let Some(role) = role {
            doc.metadata.insert("role".into(), Value::Str(role));
        }
        if let Some(unit) = unit {
            doc.metadata.insert("unit".into(), Value::Str(unit));
        }
        if let Some(email) = email {
            doc.metadata.insert("email".into(), Value::Str(email));
        }

        Some(doc)
    }
}

impl EntityLoader for UserLoader {
    fn entity_type(&self) -> EntityType {
        EntityType::User
    }

    fn load(&self) -> Result<Vec<SearchableEntity>> {
        let records = fetch(&self.store, USERS_COLLECTION, EntityType::User)?;
        Ok(records.iter().filter_map(Self::project).collect())
    }
}
