//! Core data types for the annotation storage service.
//!
//! An annotation is a user-created note attached to a document URI. It is
//! owned by exactly one user, belongs to exactly one group, and may be a
//! reply to another annotation (encoded through the `references` chain).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for an annotation.
///
/// Wraps a UUID v4, providing type safety to distinguish annotation IDs
/// from other UUID-based identifiers in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(pub Uuid);

impl AnnotationId {
    /// Creates a new random AnnotationId using UUID v4.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an AnnotationId from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AnnotationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AnnotationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ============================================================================
// Actions and Permissions
// ============================================================================

/// The kind of mutation an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationAction {
    Create,
    Update,
    Delete,
}

impl AnnotationAction {
    /// Wire name of the action, as carried in event payloads.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for AnnotationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations gated by the authorization boundary.
///
/// The HTTP method of a request implies the permission it needs:
/// GET reads, PUT updates, DELETE deletes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Read,
    Update,
    Delete,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.write_str("read"),
            Self::Update => f.write_str("update"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

// ============================================================================
// Annotation
// ============================================================================

/// Resolved document metadata attached to an annotation for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Best-known title of the annotated document.
    pub title: Option<String>,
    /// Canonical web URI of the annotated document.
    pub web_uri: Option<String>,
}

/// The core persisted entity: a note attached to a document URI.
///
/// Annotations are owned by the storage layer; the HTTP layer only ever
/// holds transient copies scoped to a single request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Opaque identifier, assigned by storage on create.
    pub id: AnnotationId,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last-modification timestamp.
    pub updated: DateTime<Utc>,
    /// Owner, in `acct:name@authority` form.
    pub userid: String,
    /// Group the annotation was posted to.
    pub groupid: String,
    /// Annotation body text.
    pub text: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Whether the annotation is visible to the group (versus owner-only).
    pub shared: bool,
    /// URI of the annotated target.
    pub target_uri: String,
    /// Selectors anchoring the annotation within the target. Opaque to
    /// this service; stored and returned verbatim.
    pub target_selectors: serde_json::Value,
    /// Ids of ancestor annotations, root first. Non-empty means this
    /// annotation is a reply.
    pub references: Vec<AnnotationId>,
    /// Client-supplied fields this service does not interpret.
    pub extra: serde_json::Value,
    /// Document metadata resolved at fetch time, if any.
    pub document: Option<DocumentInfo>,
}

impl Annotation {
    /// Whether this annotation is a reply to another annotation.
    #[must_use]
    pub fn is_reply(&self) -> bool {
        !self.references.is_empty()
    }

    /// The id of the thread root, for replies.
    #[must_use]
    pub fn thread_root(&self) -> Option<AnnotationId> {
        self.references.first().copied()
    }
}

// ============================================================================
// Tests
// ============================================================================
