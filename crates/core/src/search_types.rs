//! Query and result types for the search engine
//!
//! This module defines the boundary types the hosting application exchanges
//! with the engine:
//! - SearchQuery: free text + typed filters + sort/pagination/facet controls
//! - FilterValue: tagged filter variants (Equals, OneOf, Range)
//! - SortBy / SortOrder: sort controls
//! - SearchResult / FacetCount: ranked page plus facet counts and suggestions
//!
//! Filters are a small tagged-variant type rather than ad hoc shape-sniffing
//! on arbitrary values: malformed shapes fail at the deserialization boundary
//! instead of silently matching nothing.

use crate::error::{Error, Result};
use crate::document::{EntityType, SearchableEntity};
use crate::value::Value;
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Default page number (1-based)
pub const DEFAULT_PAGE: usize = 1;

/// Default page size
pub const DEFAULT_LIMIT: usize = 20;

fn default_page() -> usize {
    DEFAULT_PAGE
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Facets computed when a query does not name its own
pub fn default_facets() -> Vec<String> {
    vec!["type".to_string(), "tags".to_string(), "status".to_string()]
}

// ============================================================================
// Sort controls
// ============================================================================

/// Sort key for result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// Computed relevance score (default)
    #[default]
    Relevance,
    /// Case-insensitive title
    Title,
    /// Creation timestamp
    Created,
    /// Last-update timestamp
    Updated,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending
    Asc,
    /// Descending (default)
    #[default]
    Desc,
}

// ============================================================================
// FilterValue
// ============================================================================

/// Typed metadata filter
///
/// JSON shapes accepted at the boundary:
/// - scalar        -> `Equals`
/// - array         -> `OneOf` (membership)
/// - `{min, max}`  -> `Range` (numeric, either bound optional)
///
/// Anything else is rejected during deserialization. Null filter values and
/// empty shapes (`Equals(Null)`, empty `OneOf`, unbounded `Range`) are
/// ignored by the engine rather than treated as "match nothing".
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Exact scalar match
    Equals(Value),
    /// Membership match against any listed scalar
    OneOf(Vec<Value>),
    /// Numeric range containment; an absent bound is unconstrained
    Range {
        /// Inclusive lower bound
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        /// Inclusive upper bound
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
}

impl FilterValue {
    /// Parse a raw JSON filter value, rejecting malformed shapes
    pub fn from_json(raw: &serde_json::Value) -> std::result::Result<Self, String> {
        match raw {
            serde_json::Value::Null => Ok(FilterValue::Equals(Value::Null)),
            serde_json::Value::Bool(_)
            | serde_json::Value::Number(_)
            | serde_json::Value::String(_) => Ok(FilterValue::Equals(scalar_from_json(raw)?)),
            serde_json::Value::Array(items) => {
                let values = items
                    .iter()
                    .map(scalar_from_json)
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(FilterValue::OneOf(values))
            }
            serde_json::Value::Object(map) => {
                for key in map.keys() {
                    if key != "min" && key != "max" {
                        return Err(format!(
                            "invalid filter shape: unexpected key '{key}' (expected min/max)"
                        ));
                    }
                }
                let min = range_bound(map.get("min"), "min")?;
                let max = range_bound(map.get("max"), "max")?;
                Ok(FilterValue::Range { min, max })
            }
        }
    }

    /// True for shapes the engine skips entirely (unset/null semantics)
    pub fn is_noop(&self) -> bool {
        match self {
            FilterValue::Equals(value) => value.is_null(),
            FilterValue::OneOf(values) => values.is_empty(),
            FilterValue::Range { min, max } => min.is_none() && max.is_none(),
        }
    }

    /// Evaluate this filter against a document's metadata value
    ///
    /// `None` means the document lacks the field: it fails every non-noop
    /// filter shape.
    pub fn matches(&self, value: Option<&Value>) -> bool {
        if self.is_noop() {
            return true;
        }
        let Some(value) = value else {
            return false;
        };
        match self {
            FilterValue::Equals(expected) => value == expected,
            FilterValue::OneOf(options) => options.contains(value),
            FilterValue::Range { min, max } => {
                let Some(n) = value.as_f64() else {
                    return false;
                };
                min.map_or(true, |lo| n >= lo) && max.map_or(true, |hi| n <= hi)
            }
        }
    }
}

fn scalar_from_json(raw: &serde_json::Value) -> std::result::Result<Value, String> {
    match raw {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(format!("invalid filter shape: unrepresentable number {n}"))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Str(s.clone())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err("invalid filter shape: nested arrays/objects are not scalar".to_string())
        }
    }
}

fn range_bound(
    raw: Option<&serde_json::Value>,
    name: &str,
) -> std::result::Result<Option<f64>, String> {
    match raw {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| format!("invalid filter shape: unrepresentable {name} bound")),
        Some(other) => Err(format!(
            "invalid filter shape: non-numeric {name} bound {other}"
        )),
    }
}

impl<'de> Deserialize<'de> for FilterValue {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        FilterValue::from_json(&raw).map_err(D::Error::custom)
    }
}

// ============================================================================
// SearchQuery
// ============================================================================

/// A ranked, filtered, paginated search request
///
/// An empty `query_text` means "match everything". `page < 1` and
/// `limit == 0` are normalized to the defaults rather than erroring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuery {
    /// Free text; empty matches all documents
    pub query_text: String,

    /// Named metadata constraints, evaluated conjunctively
    pub filters: IndexMap<String, FilterValue>,

    /// Optional allow-list of entity types
    pub entity_types: Option<Vec<EntityType>>,

    /// Sort key
    pub sort_by: SortBy,

    /// Sort direction
    pub sort_order: SortOrder,

    /// 1-based page number
    pub page: usize,

    /// Page size
    pub limit: usize,

    /// Facet names to compute counts for
    pub facets: Vec<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        SearchQuery {
            query_text: String::new(),
            filters: IndexMap::new(),
            entity_types: None,
            sort_by: SortBy::default(),
            sort_order: SortOrder::default(),
            page: default_page(),
            limit: default_limit(),
            facets: default_facets(),
        }
    }
}

impl SearchQuery {
    /// Create a query for the given free text
    pub fn new(query_text: impl Into<String>) -> Self {
        SearchQuery {
            query_text: query_text.into(),
            ..SearchQuery::default()
        }
    }

    /// Builder: add one filter
    pub fn with_filter(mut self, name: impl Into<String>, filter: FilterValue) -> Self {
        self.filters.insert(name.into(), filter);
        self
    }

    /// Builder: restrict candidates to the given entity types
    pub fn with_entity_types(mut self, entity_types: Vec<EntityType>) -> Self {
        self.entity_types = Some(entity_types);
        self
    }

    /// Builder: set sort key
    pub fn with_sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Builder: set sort direction
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// Builder: set 1-based page number
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Builder: set page size
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Builder: set facet names to aggregate
    pub fn with_facets(mut self, facets: Vec<String>) -> Self {
        self.facets = facets;
        self
    }

    /// Reject malformed queries before execution
    ///
    /// Deserialization already rejects structurally invalid filter shapes;
    /// this covers programmatic construction: non-finite or inverted range
    /// bounds are an `InvalidQuery`, not an empty result.
    pub fn validate(&self) -> Result<()> {
        for (name, filter) in &self.filters {
            if let FilterValue::Range { min, max } = filter {
                for bound in [min, max].into_iter().flatten() {
                    if !bound.is_finite() {
                        return Err(Error::InvalidQuery(format!(
                            "filter '{name}': non-finite range bound"
                        )));
                    }
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        return Err(Error::InvalidQuery(format!(
                            "filter '{name}': range min {lo} exceeds max {hi}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Canonical cache key for memoizing the full result
    pub fn cache_key(&self) -> String {
        // Field and filter insertion order are deterministic, so the JSON
        // form is canonical for equal queries built the same way.
        let body = serde_json::to_string(self).expect("query serialization is infallible");
        format!("search:{body}")
    }
}

// ============================================================================
// SearchResult
// ============================================================================

/// One facet value and the number of candidate documents carrying it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    /// Facet value
    pub value: String,
    /// Number of candidates with this value
    pub count: usize,
}

impl FacetCount {
    /// Create a new facet count
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        FacetCount {
            value: value.into(),
            count,
        }
    }
}

/// Ranked page of results plus candidate-set aggregates
///
/// `total` counts the post-filter, pre-pagination candidate set; `facets`
/// and `suggestions` describe that whole set, not just the returned page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Score-annotated document copies for the requested page
    pub items: Vec<SearchableEntity>,

    /// Candidate count after filtering, before pagination
    pub total: usize,

    /// Facet name -> top values by descending count
    pub facets: IndexMap<String, Vec<FacetCount>>,

    /// Query completions derived from the last query term
    pub suggestions: Vec<String>,

    /// Wall-clock execution time
    pub execution_time_ms: u64,

    /// Echoed (normalized) page number
    pub page: usize,

    /// Echoed (normalized) page size
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // FilterValue parsing
    // ========================================

    #[test]
    fn test_filter_from_scalar() {
        let f = FilterValue::from_json(&serde_json::json!("PLANNING")).unwrap();
        assert_eq!(f, FilterValue::Equals(Value::Str("PLANNING".into())));

        let f = FilterValue::from_json(&serde_json::json!(3)).unwrap();
        assert_eq!(f, FilterValue::Equals(Value::Int(3)));
    }

    #[test]
    fn test_filter_from_array() {
        let f = FilterValue::from_json(&serde_json::json!(["ACTIVE", "PLANNING"])).unwrap();
        assert_eq!(
            f,
            FilterValue::OneOf(vec![
                Value::Str("ACTIVE".into()),
                Value::Str("PLANNING".into())
            ])
        );
    }

    #[test]
    fn test_filter_from_range() {
        let f = FilterValue::from_json(&serde_json::json!({"min": 1000, "max": 5000})).unwrap();
        assert_eq!(
            f,
            FilterValue::Range {
                min: Some(1000.0),
                max: Some(5000.0)
            }
        );

        // One-sided range
        let f = FilterValue::from_json(&serde_json::json!({"min": 10})).unwrap();
        assert_eq!(
            f,
            FilterValue::Range {
                min: Some(10.0),
                max: None
            }
        );
    }

    #[test]
    fn test_filter_rejects_non_numeric_range_bounds() {
        let err = FilterValue::from_json(&serde_json::json!({"min": "cheap"})).unwrap_err();
        assert!(err.contains("non-numeric"));
    }

    #[test]
    fn test_filter_rejects_unknown_object_keys() {
        let err = FilterValue::from_json(&serde_json::json!({"gte": 10})).unwrap_err();
        assert!(err.contains("unexpected key"));
    }

    #[test]
    fn test_filter_rejects_nested_array_elements() {
        let err = FilterValue::from_json(&serde_json::json!([["nested"]])).unwrap_err();
        assert!(err.contains("not scalar"));
    }

    #[test]
    fn test_filter_deserialize_rejects_malformed() {
        let result: std::result::Result<FilterValue, _> =
            serde_json::from_str(r#"{"min": "abc", "max": 5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_filter_null_is_noop() {
        let f = FilterValue::from_json(&serde_json::Value::Null).unwrap();
        assert!(f.is_noop());
        // Noop filters match everything, including absent fields
        assert!(f.matches(None));
    }

    // ========================================
    // FilterValue matching
    // ========================================

    #[test]
    fn test_equals_matching() {
        let f = FilterValue::Equals(Value::Str("ACTIVE".into()));
        assert!(f.matches(Some(&Value::Str("ACTIVE".into()))));
        assert!(!f.matches(Some(&Value::Str("RETIRED".into()))));
        assert!(!f.matches(None));
    }

    #[test]
    fn test_equals_is_type_strict() {
        let f = FilterValue::Equals(Value::Int(1));
        assert!(!f.matches(Some(&Value::Float(1.0))));
    }

    #[test]
    fn test_one_of_matching() {
        let f = FilterValue::OneOf(vec![Value::Str("a".into()), Value::Str("b".into())]);
        assert!(f.matches(Some(&Value::Str("a".into()))));
        assert!(!f.matches(Some(&Value::Str("c".into()))));
        assert!(!f.matches(None));
    }

    #[test]
    fn test_range_matching() {
        let f = FilterValue::Range {
            min: Some(1000.0),
            max: Some(5000.0),
        };
        assert!(f.matches(Some(&Value::Int(1000))));
        assert!(f.matches(Some(&Value::Float(3500.5))));
        assert!(f.matches(Some(&Value::Int(5000))));
        assert!(!f.matches(Some(&Value::Int(999))));
        assert!(!f.matches(Some(&Value::Int(5001))));
        // Missing and non-numeric fields are excluded
        assert!(!f.matches(None));
        assert!(!f.matches(Some(&Value::Str("4000".into()))));
    }

    #[test]
    fn test_range_unbounded_sides() {
        let f = FilterValue::Range {
            min: None,
            max: Some(100.0),
        };
        assert!(f.matches(Some(&Value::Int(-5))));
        assert!(!f.matches(Some(&Value::Int(101))));
    }

    // ========================================
    // SearchQuery
    // ========================================

    #[test]
    fn test_query_defaults() {
        let q = SearchQuery::default();
        assert_eq!(q.query_text, "");
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 20);
        assert_eq!(q.sort_by, SortBy::Relevance);
        assert_eq!(q.sort_order, SortOrder::Desc);
        assert_eq!(q.facets, vec!["type", "tags", "status"]);
        assert!(q.entity_types.is_none());
    }

    #[test]
    fn test_query_builder() {
        let q = SearchQuery::new("night raid")
            .with_filter(
                "basePrice",
                FilterValue::Range {
                    min: Some(1000.0),
                    max: Some(5000.0),
                },
            )
            .with_entity_types(vec![EntityType::Equipment])
            .with_sort_by(SortBy::Title)
            .with_sort_order(SortOrder::Asc)
            .with_page(2)
            .with_limit(50)
            .with_facets(vec!["type".to_string()]);

        assert_eq!(q.query_text, "night raid");
        assert_eq!(q.filters.len(), 1);
        assert_eq!(q.entity_types, Some(vec![EntityType::Equipment]));
        assert_eq!(q.sort_by, SortBy::Title);
        assert_eq!(q.sort_order, SortOrder::Asc);
        assert_eq!(q.page, 2);
        assert_eq!(q.limit, 50);
    }

    #[test]
    fn test_query_deserialize_with_defaults() {
        let q: SearchQuery = serde_json::from_str(r#"{"queryText": "drone"}"#).unwrap();
        assert_eq!(q.query_text, "drone");
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 20);
    }

    #[test]
    fn test_query_deserialize_full() {
        let q: SearchQuery = serde_json::from_str(
            r#"{
                "queryText": "goggles",
                "filters": {"basePrice": {"min": 1000, "max": 5000}, "status": "ACTIVE"},
                "entityTypes": ["equipment"],
                "sortBy": "updated",
                "sortOrder": "asc",
                "page": 3,
                "limit": 10,
                "facets": ["type"]
            }"#,
        )
        .unwrap();

        assert_eq!(q.entity_types, Some(vec![EntityType::Equipment]));
        assert_eq!(q.sort_by, SortBy::Updated);
        assert_eq!(q.sort_order, SortOrder::Asc);
        assert_eq!(
            q.filters.get("basePrice"),
            Some(&FilterValue::Range {
                min: Some(1000.0),
                max: Some(5000.0)
            })
        );
    }

    #[test]
    fn test_query_validate_inverted_range() {
        let q = SearchQuery::default().with_filter(
            "basePrice",
            FilterValue::Range {
                min: Some(5000.0),
                max: Some(1000.0),
            },
        );
        let err = q.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_query_validate_non_finite_bound() {
        let q = SearchQuery::default().with_filter(
            "basePrice",
            FilterValue::Range {
                min: Some(f64::NAN),
                max: None,
            },
        );
        assert!(matches!(q.validate(), Err(Error::InvalidQuery(_))));
    }

    #[test]
    fn test_query_validate_ok() {
        let q = SearchQuery::new("recon").with_filter(
            "basePrice",
            FilterValue::Range {
                min: Some(1.0),
                max: Some(2.0),
            },
        );
        assert!(q.validate().is_ok());
    }

    #[test]
    fn test_cache_key_stable_and_distinct() {
        let a = SearchQuery::new("night").with_page(1);
        let b = SearchQuery::new("night").with_page(1);
        let c = SearchQuery::new("night").with_page(2);

        assert_eq!(a.cache_key(), b.cache_key());
        assert_ne!(a.cache_key(), c.cache_key());
        assert!(a.cache_key().starts_with("search:"));
    }

    // ========================================
    // SearchResult
    // ========================================

    #[test]
    fn test_result_serde_roundtrip() {
        let result = SearchResult {
            items: vec![SearchableEntity::new(EntityType::System, "B", "Recon Drone")],
            total: 1,
            facets: IndexMap::from([(
                "type".to_string(),
                vec![FacetCount::new("system", 1)],
            )]),
            suggestions: vec!["recon drone".to_string()],
            execution_time_ms: 3,
            page: 1,
            limit: 20,
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"executionTimeMs\":3"));

        let back: SearchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total, 1);
        assert_eq!(back.items[0].id, "B");
        assert_eq!(back.facets["type"][0], FacetCount::new("system", 1));
    }
}
