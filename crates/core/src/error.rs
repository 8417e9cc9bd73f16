//! Error types for the muster search engine
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::document::EntityType;
use thiserror::Error;

/// Result type alias for muster operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the muster search engine
#[derive(Debug, Error)]
pub enum Error {
    /// An entity loader could not reach or fully read its source during a build.
    /// The whole build is aborted; the previously published snapshot stays live.
    #[error("source unavailable for {entity_type}: {reason}")]
    SourceUnavailable {
        /// Entity type whose loader failed
        entity_type: EntityType,
        /// Underlying failure description
        reason: String,
    },

    /// A query arrived before the first successful build published a snapshot.
    /// Retryable: the caller should back off and retry once a build completes.
    #[error("index not ready: no snapshot has been published yet")]
    IndexNotReady,

    /// Malformed query (e.g. a range filter with inverted or non-numeric bounds).
    /// Rejected at the query boundary instead of silently matching nothing.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Cache layer failure. Never fatal: callers swallow this, log it, and
    /// fall back to direct computation.
    #[error("cache error: {0}")]
    Cache(String),
}

impl Error {
    /// True for conditions the caller is expected to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::IndexNotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_source_unavailable() {
        let err = Error::SourceUnavailable {
            entity_type: EntityType::Exercise,
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("source unavailable"));
        assert!(msg.contains("exercise"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_error_display_index_not_ready() {
        let err = Error::IndexNotReady;
        assert!(err.to_string().contains("index not ready"));
    }

    #[test]
    fn test_error_display_invalid_query() {
        let err = Error::InvalidQuery("range bounds inverted".to_string());
        let msg = err.to_string();
        assert!(msg.contains("invalid query"));
        assert!(msg.contains("range bounds inverted"));
    }

    #[test]
    fn test_error_display_cache() {
        let err = Error::Cache("backend timed out".to_string());
        let msg = err.to_string();
        assert!(msg.contains("cache error"));
        assert!(msg.contains("backend timed out"));
    }

    #[test]
    fn test_retryable() {
        assert!(Error::IndexNotReady.is_retryable());
        assert!(!Error::InvalidQuery("x".into()).is_retryable());
        assert!(!Error::Cache("x".into()).is_retryable());
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        fn returns_error() -> Result<i32> {
            Err(Error::IndexNotReady)
        }

        assert_eq!(returns_result().unwrap(), 42);
        assert!(returns_error().is_err());
    }

    #[test]
    fn test_error_pattern_matching() {
        let err = Error::SourceUnavailable {
            entity_type: EntityType::User,
            reason: "timeout".to_string(),
        };

        match err {
            Error::SourceUnavailable {
                entity_type,
                reason,
            } => {
                assert_eq!(entity_type, EntityType::User);
                assert_eq!(reason, "timeout");
            }
            _ => panic!("Wrong error variant"),
        }
    }
}
