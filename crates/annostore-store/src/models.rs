//! Database models for the storage layer.
//!
//! These types map directly to database rows and are used for sqlx
//! queries. They are separate from the domain types in annostore-core so
//! the row shape can follow the schema (document join columns, UUID
//! arrays) without leaking into the API surface.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use annostore_core::{Annotation, AnnotationId, DocumentInfo};

/// Database row for the `annotations` table, with the document columns
/// from the eager LEFT JOIN against `documents`.
#[derive(Debug, Clone, FromRow)]
pub struct AnnotationRow {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub userid: String,
    pub groupid: String,
    pub text: String,
    pub tags: Vec<String>,
    pub shared: bool,
    pub target_uri: String,
    pub target_selectors: serde_json::Value,
    pub references: Vec<Uuid>,
    pub extra: serde_json::Value,
    /// Title from the joined document row, if one is linked.
    pub document_title: Option<String>,
    /// Web URI from the joined document row, if one is linked.
    pub document_web_uri: Option<String>,
}

impl From<AnnotationRow> for Annotation {
    fn from(row: AnnotationRow) -> Self {
        let document = match (&row.document_title, &row.document_web_uri) {
            (None, None) => None,
            (title, web_uri) => Some(DocumentInfo {
                title: title.clone(),
                web_uri: web_uri.clone(),
            }),
        };

        Annotation {
            id: AnnotationId::from_uuid(row.id),
            created: row.created,
            updated: row.updated,
            userid: row.userid,
            groupid: row.groupid,
            text: row.text,
            tags: row.tags,
            shared: row.shared,
            target_uri: row.target_uri,
            target_selectors: row.target_selectors,
            references: row.references.into_iter().map(AnnotationId::from_uuid).collect(),
            extra: row.extra,
            document,
        }
    }
}

/// Input for creating an annotation. Produced by the create schema after
/// validation; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewAnnotation {
    pub userid: String,
    pub groupid: String,
    pub text: String,
    pub tags: Vec<String>,
    pub shared: bool,
    pub target_uri: String,
    pub target_selectors: serde_json::Value,
    pub references: Vec<Uuid>,
    pub extra: serde_json::Value,
    /// Document metadata to upsert alongside the annotation.
    pub document_title: Option<String>,
    pub document_web_uri: Option<String>,
}

/// Partial update for an annotation. `None` fields are left unchanged.
///
/// The group is deliberately absent: group reassignment is rejected at
/// validation time, before any storage call.
#[derive(Debug, Clone, Default)]
pub struct AnnotationChanges {
    pub text: Option<String>,
    pub tags: Option<Vec<String>>,
    pub shared: Option<bool>,
    pub target_uri: Option<String>,
    pub target_selectors: Option<serde_json::Value>,
    pub extra: Option<serde_json::Value>,
    pub document_title: Option<String>,
    pub document_web_uri: Option<String>,
}

impl AnnotationChanges {
    /// Whether this update carries any change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.tags.is_none()
            && self.shared.is_none()
            && self.target_uri.is_none()
            && self.target_selectors.is_none()
            && self.extra.is_none()
            && self.document_title.is_none()
            && self.document_web_uri.is_none()
    }
}
