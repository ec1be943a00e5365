//! Error types for the storage layer.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Annotation not found.
    #[error("annotation not found: {0}")]
    AnnotationNotFound(Uuid),

    /// A reply references an annotation that does not exist.
    #[error("invalid reference: annotation {0} does not exist")]
    InvalidReference(Uuid),

    /// Serialization error for JSONB columns.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether this error means the requested record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AnnotationNotFound(_))
    }
}
